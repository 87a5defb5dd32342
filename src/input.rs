//! Local input handling: debounced buttons and the rotary dial.
//!
//! ## Buttons
//!
//! Buttons are level-sampled once per loop iteration. A pressed button is
//! accepted when at least `debounce_ms` has passed since the last accepted
//! press, so holding a button auto-repeats at the debounce interval.
//!
//! | `DebounceMode` | Timestamp          | Effect                                     |
//! |----------------|--------------------|--------------------------------------------|
//! | `Shared`       | one for all inputs | near-simultaneous presses collapse into one|
//! | `PerInput`     | one per button     | each button is debounced on its own        |
//!
//! Buttons are checked in the order next, prev, select, mode.
//!
//! ## Dial
//!
//! The encoder count is turned into a value clamped to `[min, max]`. Once the
//! value has been still for `settle_ms` and differs from the last published
//! value, it is due for publishing to the current target topic. A press of
//! the dial button cycles the target.

use crate::config::DebounceMode;
use crate::profile::DialSpec;

/// Level of every local input at one instant (`true` = pressed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub next: bool,
    pub prev: bool,
    pub select: bool,
    pub mode: bool,
    /// Raw encoder count, on nodes with a dial.
    pub encoder_count: Option<i32>,
    pub dial_button: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Next,
    Prev,
    Select,
    ToggleMode,
}

const ORDER: [UiAction; 4] = [UiAction::Next, UiAction::Prev, UiAction::Select, UiAction::ToggleMode];

pub struct Debouncer {
    interval_ms: u32,
    mode: DebounceMode,
    /// Last accepted press per button; only slot 0 is used in shared mode.
    last_ms: [Option<u64>; 4],
}

impl Debouncer {
    pub fn new(interval_ms: u32, mode: DebounceMode) -> Self {
        Self { interval_ms, mode, last_ms: [None; 4] }
    }

    /// Accepted actions for this sample, in check order.
    pub fn actions(&mut self, now_ms: u64, snap: &InputSnapshot) -> heapless::Vec<UiAction, 4> {
        let levels = [snap.next, snap.prev, snap.select, snap.mode];
        let mut out = heapless::Vec::new();
        for (i, (&pressed, action)) in levels.iter().zip(ORDER).enumerate() {
            if pressed && self.accept(now_ms, i) {
                let _ = out.push(action);
            }
        }
        out
    }

    fn accept(&mut self, now_ms: u64, button: usize) -> bool {
        let slot = match self.mode {
            DebounceMode::Shared => 0,
            DebounceMode::PerInput => button,
        };
        let ready = self.last_ms[slot]
            .is_none_or(|last| now_ms.saturating_sub(last) >= u64::from(self.interval_ms));
        if ready {
            self.last_ms[slot] = Some(now_ms);
        }
        ready
    }
}

// ── Dial ─────────────────────────────────────────────────────────

/// A settled dial value ready to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialPublish {
    pub topic: &'static str,
    pub value: i32,
}

/// What one dial update changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialUpdate {
    pub moved_to: Option<i32>,
    pub target_changed: Option<&'static str>,
}

pub struct Dial {
    spec: DialSpec,
    value: i32,
    last_raw: Option<i32>,
    last_change_ms: u64,
    last_published: Option<i32>,
    target: usize,
    button_was_down: bool,
}

impl Dial {
    pub fn new(spec: DialSpec) -> Self {
        Self {
            spec,
            value: 0_i32.clamp(spec.min, spec.max),
            last_raw: None,
            last_change_ms: 0,
            last_published: None,
            target: 0,
            button_was_down: false,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn target(&self) -> &'static str {
        self.spec.targets.get(self.target).copied().unwrap_or_default()
    }

    /// Feed the raw encoder count and dial button level.
    pub fn update(&mut self, now_ms: u64, raw_count: i32, button_down: bool) -> DialUpdate {
        let mut out = DialUpdate::default();

        let delta = self.last_raw.map_or(0, |last| raw_count.wrapping_sub(last));
        self.last_raw = Some(raw_count);
        if delta != 0 {
            let next = self.value.saturating_add(delta).clamp(self.spec.min, self.spec.max);
            self.last_change_ms = now_ms;
            if next != self.value {
                self.value = next;
                out.moved_to = Some(next);
            }
        }

        if button_down && !self.button_was_down && !self.spec.targets.is_empty() {
            self.target = (self.target + 1) % self.spec.targets.len();
            out.target_changed = Some(self.target());
        }
        self.button_was_down = button_down;

        out
    }

    /// The value to publish, once it has settled and differs from the last
    /// published one.
    pub fn pending(&self, now_ms: u64) -> Option<DialPublish> {
        let settled = now_ms.saturating_sub(self.last_change_ms) >= u64::from(self.spec.settle_ms);
        (settled && self.last_published != Some(self.value))
            .then(|| DialPublish { topic: self.target(), value: self.value })
    }

    pub fn mark_published(&mut self, value: i32) {
        self.last_published = Some(value);
    }
}
