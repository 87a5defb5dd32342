//! MQ-6 LPG / butane gas sensor.
//!
//! Reads the heater-divider output on an ADC1 channel (configured by
//! hw_init) and reports the raw 12-bit count. No ppm conversion: consumers
//! compare readings against each other, not against absolute limits.

use crate::drivers::hw_init;
use crate::error::SensorError;

/// Full-scale 12-bit reading.
pub const ADC_MAX: u16 = 4095;

pub struct GasSensor {
    adc_channel: u32,
}

impl GasSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self { adc_channel }
    }

    pub fn read(&mut self) -> Result<i32, SensorError> {
        let raw = hw_init::adc1_read(self.adc_channel)?.min(ADC_MAX);
        Ok(i32::from(raw))
    }
}
