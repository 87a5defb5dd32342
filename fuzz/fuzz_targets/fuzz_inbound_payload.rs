//! Fuzz target: inbound channel payload decoding
//!
//! Decodes arbitrary payloads under every domain and range policy and checks
//! the stored-value invariants.
//!
//! cargo fuzz run fuzz_inbound_payload

#![no_main]

use homenode::app::commands::InboundMessage;
use homenode::channel::decode_inbound;
use homenode::config::InboundRangePolicy;
use homenode::profile::{PublishMode, ValueDomain};
use libfuzzer_sys::fuzz_target;

const POLICIES: [InboundRangePolicy; 3] = [
    InboundRangePolicy::Accept,
    InboundRangePolicy::Reject,
    InboundRangePolicy::Clamp,
];

fuzz_target!(|data: &[u8]| {
    let _ = InboundMessage::new("hall/fan", data);

    let max = data.first().map_or(1, |&b| u16::from(b).max(1));
    for policy in POLICIES {
        if let Ok(v) = decode_inbound(ValueDomain::Toggle, data, policy) {
            assert!(v == 0 || v == 1);
        }
        let bounded = decode_inbound(ValueDomain::Bounded { max }, data, policy);
        if let (Ok(v), InboundRangePolicy::Reject | InboundRangePolicy::Clamp) = (bounded, policy) {
            assert!((0..=i32::from(max)).contains(&v));
        }
        let sensor = ValueDomain::Sensor { publish: PublishMode::Always, interval_ms: 0 };
        assert!(decode_inbound(sensor, data, policy).is_ok());
    }
});
