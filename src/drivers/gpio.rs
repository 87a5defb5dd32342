//! `embedded-hal` digital pins over the raw [`hw_init`](super::hw_init) accessors.
//!
//! Pins are configured once by `hw_init::init_peripherals()`; a [`SysPin`]
//! only names the GPIO number, so it is `Copy` and free to construct.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysPin(pub i32);

impl ErrorType for SysPin {
    type Error = Infallible;
}

impl InputPin for SysPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.0))
    }
}

impl OutputPin for SysPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}
