//! Half-quadrature rotary encoder counter.
//!
//! The GPIO ISR on channel A fires on both edges and calls
//! [`encoder_isr_handler`] with the levels of A and B. Equal levels count one
//! way, differing levels the other. The main loop only reads the count.

use core::sync::atomic::{AtomicI32, Ordering};

/// Raw encoder count. Written by the ISR, read by the main loop.
static ENCODER_COUNT: AtomicI32 = AtomicI32::new(0);

/// Called from GPIO ISR context on every edge of channel A.
/// Must be lock-free and allocation-free.
#[inline]
pub fn encoder_isr_handler(a: bool, b: bool) {
    let delta = if a == b { -1 } else { 1 };
    ENCODER_COUNT.fetch_add(delta, Ordering::Relaxed);
}

/// Main-loop view of the ISR-maintained count.
#[derive(Debug)]
pub struct EncoderCounter {
    _private: (),
}

impl EncoderCounter {
    /// Clears the count. Construct once, after the ISR is attached.
    pub fn new() -> Self {
        ENCODER_COUNT.store(0, Ordering::Relaxed);
        Self { _private: () }
    }

    pub fn count(&self) -> i32 {
        ENCODER_COUNT.load(Ordering::Relaxed)
    }
}

impl Default for EncoderCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulation: turn the knob by `detents` (negative = counter-clockwise).
#[cfg(not(target_os = "espidf"))]
pub fn sim_rotate(detents: i32) {
    for _ in 0..detents.unsigned_abs() {
        if detents > 0 {
            encoder_isr_handler(true, false);
        } else {
            encoder_isr_handler(true, true);
        }
    }
}
