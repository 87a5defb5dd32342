//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceLoop (domain)
//! ```
//!
//! WiFi association, the MQTT session, sensors, relays, buttons and the
//! display all sit behind these traits. The
//! [`DeviceLoop`](super::service::DeviceLoop) consumes them via generics, so
//! the loop runs unchanged against ESP-IDF drivers, the host simulation, or
//! test mocks.
//!
//! Every method is non-blocking: it starts work or reports a level, and the
//! loop polls again on the next tick.

use crate::codec::GpsFix;
use crate::error::{LinkError, SensorError};
use crate::input::InputSnapshot;
use crate::ui::Frame;

use super::commands::InboundMessage;

// ───────────────────────────────────────────────────────────────
// Network port (WiFi station)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort {
    /// Start associating with the configured access point. Must return
    /// without waiting for the association to finish.
    fn begin_connect(&mut self) -> Result<(), LinkError>;

    /// Live association level (station connected and IP assigned).
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Broker port (MQTT session)
// ───────────────────────────────────────────────────────────────

pub trait BrokerPort {
    /// Start a session under `client_id`.
    fn connect(&mut self, client_id: &str) -> Result<(), LinkError>;

    /// Live session level.
    fn is_connected(&self) -> bool;

    /// Number of sessions established so far. A change while the level
    /// stayed up means the session dropped and came back between two polls,
    /// taking its subscriptions with it.
    fn session_generation(&self) -> u32;

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError>;

    /// Queue a publish. Fire-and-forget: success means queued, not delivered.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), LinkError>;

    /// Next message received since the last call, if any.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Sample the hardware behind channel `channel`.
    ///
    /// `None` means the channel has no local sensor on this board.
    fn sample(&mut self, channel: usize) -> Option<Result<i32, SensorError>>;

    /// A new GPS fix, if the receiver produced one since the last call.
    fn take_gps_fix(&mut self) -> Option<GpsFix> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Drive the output bound to channel `channel` (relay, LED) to `value`.
    /// Channels without an output are ignored.
    fn apply(&mut self, channel: usize, value: i32);
}

// ───────────────────────────────────────────────────────────────
// Input port (buttons, encoder)
// ───────────────────────────────────────────────────────────────

pub trait InputPort {
    /// Sample every local input once.
    fn read_inputs(&mut self, now_ms: u64) -> InputSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    /// Replace the screen contents with `frame`.
    fn render(&mut self, frame: &Frame<'_>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
