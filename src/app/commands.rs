//! Inbound messages handed to the device loop.
//!
//! The MQTT adapter copies every received PUBLISH into an
//! [`InboundMessage`] so the loop owns the data without borrowing client
//! buffers.

use crate::codec::MAX_PAYLOAD;
use crate::error::LinkError;

pub const MAX_TOPIC: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_TOPIC>,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl InboundMessage {
    /// Copy a received message. Topics or payloads that do not fit are
    /// rejected whole rather than truncated.
    pub fn new(topic: &str, payload: &[u8]) -> Result<Self, LinkError> {
        let mut t = heapless::String::new();
        t.push_str(topic).map_err(|()| LinkError::Oversized)?;
        let p = heapless::Vec::from_slice(payload).map_err(|()| LinkError::Oversized)?;
        Ok(Self { topic: t, payload: p })
    }

    /// Payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_payload_rejected() {
        let big = [b'x'; MAX_PAYLOAD + 1];
        assert_eq!(InboundMessage::new("t", &big), Err(LinkError::Oversized));
        let ok = InboundMessage::new("hall/light", b"1").unwrap();
        assert_eq!(ok.payload_str(), Some("1"));
    }
}
