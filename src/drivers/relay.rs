//! Digital outputs (relays, LED strings) bound to channel indices.
//!
//! Outputs are active-high and driven low at construction. Any non-zero
//! channel value switches the output on.

use embedded_hal::digital::OutputPin;
use log::warn;

pub const MAX_OUTPUTS: usize = 8;

pub struct RelayBank<P: OutputPin> {
    outputs: heapless::Vec<(usize, P), MAX_OUTPUTS>,
    levels: u8,
}

impl<P: OutputPin> RelayBank<P> {
    pub fn new() -> Self {
        Self {
            outputs: heapless::Vec::new(),
            levels: 0,
        }
    }

    /// Bind `pin` to `channel` and switch it off. Bindings past
    /// [`MAX_OUTPUTS`] are dropped with a warning.
    pub fn bind(mut self, channel: usize, mut pin: P) -> Self {
        let _ = pin.set_low();
        if self.outputs.push((channel, pin)).is_err() {
            warn!("Relay: no room for channel {}", channel);
        }
        self
    }

    /// Bind consecutive pins to channels `0..pins.len()`.
    pub fn with_pins(pins: impl IntoIterator<Item = P>) -> Self {
        pins.into_iter()
            .enumerate()
            .fold(Self::new(), |bank, (channel, pin)| bank.bind(channel, pin))
    }

    /// Drive the output bound to `channel`. Returns `false` when nothing is
    /// bound to it.
    pub fn set(&mut self, channel: usize, value: i32) -> bool {
        let Some(slot) = self.outputs.iter().position(|(c, _)| *c == channel) else {
            return false;
        };
        let on = value != 0;
        let pin = &mut self.outputs[slot].1;
        let res = if on { pin.set_high() } else { pin.set_low() };
        if res.is_err() {
            warn!("Relay: write failed on channel {}", channel);
            return true;
        }
        if on {
            self.levels |= 1 << slot;
        } else {
            self.levels &= !(1 << slot);
        }
        true
    }

    /// Last level written to the output bound to `channel`.
    pub fn is_on(&self, channel: usize) -> Option<bool> {
        self.outputs
            .iter()
            .position(|(c, _)| *c == channel)
            .map(|slot| self.levels & (1 << slot) != 0)
    }
}

impl<P: OutputPin> Default for RelayBank<P> {
    fn default() -> Self {
        Self::new()
    }
}
