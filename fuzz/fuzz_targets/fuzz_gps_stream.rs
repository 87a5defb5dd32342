//! Fuzz target: `GpsReceiver::poll`
//!
//! Streams arbitrary bytes through the NMEA line assembler and asserts that
//! every fix it yields is a plausible position.
//!
//! cargo fuzz run fuzz_gps_stream

#![no_main]

use std::collections::VecDeque;

use homenode::sensors::gps::GpsReceiver;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut rx = GpsReceiver::new(data.iter().copied().collect::<VecDeque<u8>>());
    if let Some(fix) = rx.poll() {
        assert!(fix.latitude.abs() <= 90.0, "latitude {}", fix.latitude);
        assert!(fix.longitude.abs() <= 180.0, "longitude {}", fix.longitude);
    }
    // The source is fully drained; a second poll sees nothing new.
    assert!(rx.source_mut().is_empty());
    assert_eq!(rx.poll(), None);
});
