//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Every event is one line, prefixed with a fixed tag so the serial output
//! can be filtered.

use log::{debug, info, warn};

use crate::app::events::{AppEvent, Link};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn link_name(link: Link) -> &'static str {
    match link {
        Link::Network => "wifi",
        Link::Broker => "mqtt",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { profile } => {
                info!("START | profile={}", profile);
            }
            AppEvent::Connecting { link, attempt } => {
                info!("LINK  | {} attempt {}", link_name(*link), attempt);
            }
            AppEvent::LinkUp(link) => {
                info!("LINK  | {} up", link_name(*link));
            }
            AppEvent::LinkDown(link) => {
                warn!("LINK  | {} down", link_name(*link));
            }
            AppEvent::BootDegraded { attempts } => {
                warn!("LINK  | wifi gave up after {} attempts, running offline", attempts);
            }
            AppEvent::Subscribed { topic } => {
                info!("SUB   | {}", topic);
            }
            AppEvent::SubscribeFailed { topic, error } => {
                warn!("SUB   | {} failed: {}", topic, error);
            }
            AppEvent::Published { topic, value: Some(v), retained } => {
                debug!("PUB   | {}={} retain={}", topic, v, retained);
            }
            AppEvent::Published { topic, value: None, retained } => {
                debug!("PUB   | {} (composite) retain={}", topic, retained);
            }
            AppEvent::ChannelChanged { channel, value, remote } => {
                info!(
                    "CHAN  | #{} = {} ({})",
                    channel,
                    value,
                    if *remote { "remote" } else { "local" }
                );
            }
            AppEvent::InboundRejected { channel, error } => {
                warn!("CHAN  | #{} rejected inbound: {}", channel, error);
            }
            AppEvent::AuxUpdated { index } => {
                debug!("AUX   | #{} updated", index);
            }
            AppEvent::DialTarget { topic } => {
                info!("DIAL  | target {}", topic);
            }
        }
    }
}
