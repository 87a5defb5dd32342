//! Active-low push-button pad.
//!
//! ## Hardware
//!
//! Momentary switches to ground with the internal pull-up enabled, so a
//! pressed button reads low. The pad only reports raw levels; edge handling
//! and debouncing live in [`crate::input::Debouncer`].
//!
//! | Board         | Buttons                          |
//! |---------------|----------------------------------|
//! | hall          | next, prev, select, mode         |
//! | lawn-control  | encoder push button              |
//! | others        | none                             |

use embedded_hal::digital::InputPin;

use crate::input::InputSnapshot;

pub struct ButtonPad<P: InputPin> {
    next: Option<P>,
    prev: Option<P>,
    select: Option<P>,
    mode: Option<P>,
    dial: Option<P>,
}

impl<P: InputPin> ButtonPad<P> {
    /// Menu pad with the four navigation buttons.
    pub fn menu(next: P, prev: P, select: P, mode: P) -> Self {
        Self {
            next: Some(next),
            prev: Some(prev),
            select: Some(select),
            mode: Some(mode),
            dial: None,
        }
    }

    /// Only the push switch on a rotary dial.
    pub fn dial(button: P) -> Self {
        Self {
            dial: Some(button),
            ..Self::none()
        }
    }

    pub fn none() -> Self {
        Self {
            next: None,
            prev: None,
            select: None,
            mode: None,
            dial: None,
        }
    }

    /// Sample every fitted button. `encoder_count` is left for the caller.
    pub fn read(&mut self) -> InputSnapshot {
        InputSnapshot {
            next: pressed(&mut self.next),
            prev: pressed(&mut self.prev),
            select: pressed(&mut self.select),
            mode: pressed(&mut self.mode),
            encoder_count: None,
            dial_button: pressed(&mut self.dial),
        }
    }
}

/// A read error counts as released.
fn pressed<P: InputPin>(pin: &mut Option<P>) -> bool {
    pin.as_mut().is_some_and(|p| p.is_low().unwrap_or(false))
}
