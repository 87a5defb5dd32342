//! Outbound application events.
//!
//! The [`DeviceLoop`](super::service::DeviceLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log, test recorder).

use crate::error::{CodecError, LinkError};

/// Which link an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Network,
    Broker,
}

/// Structured events emitted by the device loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The loop has started for the named profile.
    Started { profile: &'static str },

    /// A connection attempt was started.
    Connecting { link: Link, attempt: u32 },

    LinkUp(Link),

    LinkDown(Link),

    /// The boot policy gave up on the network; the node runs offline.
    BootDegraded { attempts: u32 },

    Subscribed { topic: &'static str },

    SubscribeFailed { topic: &'static str, error: LinkError },

    /// `value` is `None` for composite payloads (GPS fixes).
    Published { topic: &'static str, value: Option<i32>, retained: bool },

    /// A channel value changed, locally or from the broker.
    ChannelChanged { channel: usize, value: i32, remote: bool },

    /// An inbound message for a known channel was rejected.
    InboundRejected { channel: usize, error: CodecError },

    /// An auxiliary string topic was updated.
    AuxUpdated { index: usize },

    /// The dial switched its publish target.
    DialTarget { topic: &'static str },
}
