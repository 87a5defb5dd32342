//! HC-SR04 style ultrasonic ranger.
//!
//! A 10 µs trigger pulse starts a measurement; the echo pin stays high for
//! the sound's round trip. Missing echoes and readings past the configured
//! range both report the maximum range, so a clear lawn reads as "far".
//!
//! On host targets the echo width comes from `hw_init::sim_set_pulse_us`.

use log::debug;

use crate::drivers::hw_init;

/// Echo microseconds per centimetre of range (there and back).
const US_ROUNDTRIP_CM: u32 = 57;

pub struct Ultrasonic {
    trigger: i32,
    echo: i32,
    max_cm: i32,
}

impl Ultrasonic {
    pub fn new(trigger: i32, echo: i32, max_cm: i32) -> Self {
        Self { trigger, echo, max_cm: max_cm.max(1) }
    }

    /// Range in whole centimetres, `max_cm` when nothing answers.
    pub fn distance_cm(&mut self) -> i32 {
        let timeout_us = (self.max_cm as u32 + 1) * US_ROUNDTRIP_CM;
        let cm = hw_init::ping(self.trigger, self.echo, timeout_us).map_or(0, echo_to_cm);
        if cm == 0 || cm > self.max_cm {
            debug!("Sonar: GPIO{} no echo, reporting {} cm", self.echo, self.max_cm);
            return self.max_cm;
        }
        cm
    }
}

fn echo_to_cm(us: u32) -> i32 {
    ((us + US_ROUNDTRIP_CM / 2) / US_ROUNDTRIP_CM) as i32
}
