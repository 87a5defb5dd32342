//! Peripheral drivers and one-shot hardware initialisation.

pub mod button;
pub mod encoder;
pub mod gpio;
pub mod hw_init;
pub mod oled;
pub mod relay;
