//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub binds locally fitted sensors to channel indices of the active
//! profile, and optionally owns the GPS receiver. Channels with nothing
//! bound report `None` so the device loop skips them.

pub mod gas;
pub mod gps;
pub mod ultrasonic;

use crate::codec::GpsFix;
use crate::error::SensorError;
use gas::GasSensor;
use gps::{ByteSource, GpsReceiver};
use ultrasonic::Ultrasonic;

const MAX_BOUND: usize = 4;

pub enum SensorSource {
    Sonar(Ultrasonic),
    Gas(GasSensor),
}

impl SensorSource {
    fn read(&mut self) -> Result<i32, SensorError> {
        match self {
            Self::Sonar(s) => Ok(s.distance_cm()),
            Self::Gas(g) => g.read(),
        }
    }
}

pub struct SensorHub {
    bound: heapless::Vec<(usize, SensorSource), MAX_BOUND>,
    gps: Option<GpsReceiver<Box<dyn ByteSource + Send>>>,
}

impl ByteSource for Box<dyn ByteSource + Send> {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_available(buf)
    }
}

impl SensorHub {
    pub fn new() -> Self {
        Self {
            bound: heapless::Vec::new(),
            gps: None,
        }
    }

    /// Attach `source` to channel `channel`. Rebinding replaces the old source.
    pub fn bind(mut self, channel: usize, source: SensorSource) -> Self {
        if let Some(slot) = self.bound.iter_mut().find(|(c, _)| *c == channel) {
            slot.1 = source;
        } else if self.bound.push((channel, source)).is_err() {
            log::warn!("Sensors: no room for channel {}", channel);
        }
        self
    }

    pub fn with_gps(mut self, uart: Box<dyn ByteSource + Send>) -> Self {
        self.gps = Some(GpsReceiver::new(uart));
        self
    }

    pub fn sample(&mut self, channel: usize) -> Option<Result<i32, SensorError>> {
        self.bound
            .iter_mut()
            .find(|(c, _)| *c == channel)
            .map(|(_, source)| source.read())
    }

    pub fn take_gps_fix(&mut self) -> Option<GpsFix> {
        self.gps.as_mut().and_then(GpsReceiver::poll)
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::hw_init::{sim_set_adc, sim_set_pulse_us};
    use std::collections::VecDeque;

    #[test]
    fn channels_route_to_bound_sources() {
        sim_set_adc(8, 321);
        sim_set_pulse_us(29, 0);
        let mut hub = SensorHub::new()
            .bind(4, SensorSource::Gas(GasSensor::new(8)))
            .bind(5, SensorSource::Sonar(Ultrasonic::new(28, 29, 200)));
        assert_eq!(hub.sample(4), Some(Ok(321)));
        assert_eq!(hub.sample(5), Some(Ok(200)));
        assert_eq!(hub.sample(0), None);
        assert_eq!(hub.take_gps_fix(), None);
    }

    #[test]
    fn gps_fix_flows_through_hub() {
        let mut uart = VecDeque::new();
        uart.extend(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n");
        let mut hub = SensorHub::new().with_gps(Box::new(uart));
        let fix = hub.take_gps_fix().unwrap();
        assert_eq!(fix.satellites, 8);
        assert_eq!(hub.take_gps_fix(), None);
    }
}
