//! Channel state and value-domain rules.
//!
//! [`Channels`] pairs a profile's static channel table with the mutable value
//! and dirty flag of each channel. All writes go through it so the domain
//! invariants (toggle in {0, 1}, bounded in `[0, max]` unless the inbound
//! policy accepts anything) hold in one place.

use crate::codec;
use crate::config::InboundRangePolicy;
use crate::error::CodecError;
use crate::profile::{ChannelSpec, MAX_CHANNELS, ValueDomain};

/// Mutable half of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub value: i32,
    /// Set on any change; cleared once the display has been redrawn.
    pub dirty: bool,
}

/// Direction of a local edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// Percentage channels move in steps of this size.
pub const PERCENT_STEP: i32 = 10;

/// Apply one local edit step to `value` under `domain`.
///
/// Toggles flip. Percentage channels (`max == 100`) move by
/// [`PERCENT_STEP`] and clamp to `[0, 100]`. Other bounded channels
/// increment modulo `max` and decrement from 0 to `max`. Sensor values are
/// never edited locally and come back unchanged.
pub fn step_value(domain: ValueDomain, value: i32, step: Step) -> i32 {
    match domain {
        ValueDomain::Toggle => i32::from(value == 0),
        ValueDomain::Bounded { max: 100 } => match step {
            Step::Up => value.saturating_add(PERCENT_STEP).clamp(0, 100),
            Step::Down => value.saturating_sub(PERCENT_STEP).clamp(0, 100),
        },
        ValueDomain::Bounded { max } => {
            let max = i32::from(max);
            match step {
                Step::Up => value.saturating_add(1).rem_euclid(max),
                Step::Down if value <= 0 => max,
                Step::Down => value - 1,
            }
        }
        ValueDomain::Sensor { .. } => value,
    }
}

/// Decode an inbound payload for a channel of the given domain.
pub fn decode_inbound(
    domain: ValueDomain,
    payload: &[u8],
    policy: InboundRangePolicy,
) -> Result<i32, CodecError> {
    match domain {
        ValueDomain::Toggle => codec::parse_toggle(payload),
        ValueDomain::Bounded { max } => {
            let max = i32::from(max);
            match policy {
                InboundRangePolicy::Accept => Ok(codec::parse_int_lenient(payload)),
                InboundRangePolicy::Reject => {
                    let v = codec::parse_int(payload)?;
                    if (0..=max).contains(&v) { Ok(v) } else { Err(CodecError::OutOfRange) }
                }
                InboundRangePolicy::Clamp => Ok(codec::parse_int(payload)?.clamp(0, max)),
            }
        }
        // Remote readings such as "23.5" are truncated to their integer part.
        ValueDomain::Sensor { .. } => Ok(codec::parse_int_lenient(payload)),
    }
}

/// Outcome of writing a value into a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed(i32),
    Unchanged,
}

/// All channels of one node.
pub struct Channels {
    specs: &'static [ChannelSpec],
    states: heapless::Vec<ChannelState, MAX_CHANNELS>,
}

impl Channels {
    /// Every channel starts at 0 and dirty so the first frame is drawn.
    pub fn new(specs: &'static [ChannelSpec]) -> Self {
        let mut states = heapless::Vec::new();
        for _ in specs.iter().take(MAX_CHANNELS) {
            let _ = states.push(ChannelState { value: 0, dirty: true });
        }
        Self { specs: &specs[..states.len()], states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn spec(&self, idx: usize) -> Option<&'static ChannelSpec> {
        self.specs.get(idx)
    }

    pub fn state(&self, idx: usize) -> Option<ChannelState> {
        self.states.get(idx).copied()
    }

    pub fn value(&self, idx: usize) -> Option<i32> {
        self.states.get(idx).map(|s| s.value)
    }

    /// Exact string match on the channel topic.
    pub fn find_by_topic(&self, topic: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.topic == topic)
    }

    /// Store a value received from the broker.
    ///
    /// Re-applying the current value is a no-op and leaves `dirty` alone.
    pub fn apply_remote(
        &mut self,
        idx: usize,
        payload: &[u8],
        policy: InboundRangePolicy,
    ) -> Result<Applied, CodecError> {
        let Some(spec) = self.specs.get(idx) else {
            return Ok(Applied::Unchanged);
        };
        let value = decode_inbound(spec.domain, payload, policy)?;
        Ok(self.set(idx, value))
    }

    /// Store a locally sampled sensor value.
    pub fn set_local(&mut self, idx: usize, value: i32) -> Applied {
        self.set(idx, value)
    }

    /// Edit a channel from the local UI. Sensor channels are not editable.
    pub fn step(&mut self, idx: usize, step: Step) -> Applied {
        let (Some(spec), Some(state)) = (self.specs.get(idx), self.states.get(idx)) else {
            return Applied::Unchanged;
        };
        if spec.domain.is_sensor() {
            return Applied::Unchanged;
        }
        let next = step_value(spec.domain, state.value, step);
        self.set(idx, next)
    }

    fn set(&mut self, idx: usize, value: i32) -> Applied {
        match self.states.get_mut(idx) {
            Some(state) if state.value != value => {
                state.value = value;
                state.dirty = true;
                Applied::Changed(value)
            }
            _ => Applied::Unchanged,
        }
    }

    pub fn any_dirty(&self) -> bool {
        self.states.iter().any(|s| s.dirty)
    }

    pub fn clear_dirty(&mut self) {
        for s in &mut self.states {
            s.dirty = false;
        }
    }
}
