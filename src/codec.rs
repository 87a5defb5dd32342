//! MQTT payload encoding and decoding.
//!
//! Channel values travel as decimal ASCII text; toggles use the literal
//! tokens `"0"` and `"1"`. GPS fixes are a small flat JSON object with a fixed
//! key order and fixed decimal places, written directly into a stack buffer.

use core::fmt::Write;

use crate::error::CodecError;

/// Largest payload the node sends or accepts.
pub const MAX_PAYLOAD: usize = 128;

pub type Payload = heapless::String<MAX_PAYLOAD>;

/// Integer channel value as decimal text.
pub fn encode_int(value: i32) -> heapless::String<12> {
    let mut out = heapless::String::new();
    // i32::MIN is 11 characters; cannot overflow.
    let _ = write!(out, "{}", value);
    out
}

/// Accept only the exact toggle tokens.
pub fn parse_toggle(payload: &[u8]) -> Result<i32, CodecError> {
    match payload {
        b"0" => Ok(0),
        b"1" => Ok(1),
        _ => Err(CodecError::NotToggle),
    }
}

/// Strict decimal integer: optional sign, digits, nothing else.
pub fn parse_int(payload: &[u8]) -> Result<i32, CodecError> {
    let text = core::str::from_utf8(payload).map_err(|_| CodecError::NotUtf8)?;
    text.parse::<i32>().map_err(|_| CodecError::NotInteger)
}

/// Lenient integer parse used when inbound values are accepted unchecked.
///
/// Skips leading whitespace, reads an optional sign and the longest run of
/// digits, and ignores the rest. No digits yields 0. Saturates on overflow.
pub fn parse_int_lenient(payload: &[u8]) -> i32 {
    let mut bytes = payload.iter().copied().skip_while(u8::is_ascii_whitespace).peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };
    let mut acc: i64 = 0;
    for b in bytes.take_while(u8::is_ascii_digit) {
        acc = (acc * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let signed = if negative { -acc } else { acc };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// One position report from the GPS receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above mean sea level.
    pub altitude: f64,
    pub satellites: u32,
    pub hdop: f64,
}

/// Render a fix as the JSON object consumers of the `gps` topic expect.
pub fn encode_gps(fix: &GpsFix) -> Result<Payload, CodecError> {
    let mut out = Payload::new();
    write!(
        out,
        "{{\"latitude\": {:.6},\"longitude\": {:.6},\"altitude\": {:.2},\"satellites\": {},\"hdop\": {:.2}}}",
        fix.latitude, fix.longitude, fix.altitude, fix.satellites, fix.hdop
    )
    .map_err(|_| CodecError::BufferFull)?;
    Ok(out)
}
