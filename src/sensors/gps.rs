//! NEO-6M GPS receiver on a UART.
//!
//! The module streams NMEA sentences at 9600 baud. [`GpsReceiver`] drains
//! whatever bytes the UART has buffered, reassembles lines and turns every
//! valid GGA sentence with a fix into a [`GpsFix`]. Other sentences are
//! ignored. Lines with a bad checksum are dropped.

use log::{debug, warn};

use crate::codec::GpsFix;

/// Longest NMEA sentence is 82 characters including `$` and CRLF.
const MAX_SENTENCE: usize = 96;

/// Non-blocking byte stream (UART receive buffer).
pub trait ByteSource {
    /// Copy up to `buf.len()` already-received bytes. Never waits.
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
}

#[cfg(not(target_os = "espidf"))]
impl ByteSource for std::collections::VecDeque<u8> {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        for (dst, src) in buf.iter_mut().zip(self.drain(..n)) {
            *dst = src;
        }
        n
    }
}

#[cfg(target_os = "espidf")]
impl ByteSource for esp_idf_svc::hal::uart::UartDriver<'static> {
    fn read_available(&mut self, buf: &mut [u8]) -> usize {
        self.read(buf, esp_idf_svc::hal::delay::NON_BLOCK).unwrap_or(0)
    }
}

pub struct GpsReceiver<S: ByteSource> {
    source: S,
    line: heapless::Vec<u8, MAX_SENTENCE>,
    overflow: bool,
}

impl<S: ByteSource> GpsReceiver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            line: heapless::Vec::new(),
            overflow: false,
        }
    }

    /// Drain the UART and return the newest fix seen, if any.
    pub fn poll(&mut self) -> Option<GpsFix> {
        let mut latest = None;
        let mut chunk = [0u8; 64];
        loop {
            let n = self.source.read_available(&mut chunk);
            if n == 0 {
                break;
            }
            for &b in &chunk[..n] {
                if let Some(fix) = self.feed(b) {
                    latest = Some(fix);
                }
            }
        }
        latest
    }

    fn feed(&mut self, byte: u8) -> Option<GpsFix> {
        match byte {
            b'$' => {
                self.line.clear();
                self.overflow = false;
                let _ = self.line.push(byte);
                None
            }
            b'\r' => None,
            b'\n' => {
                let fix = if self.overflow { None } else { parse_gga(&self.line) };
                self.line.clear();
                self.overflow = false;
                fix
            }
            _ => {
                if self.line.push(byte).is_err() {
                    self.overflow = true;
                }
                None
            }
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Parse one `$xxGGA` sentence (without line terminator).
///
/// Returns `None` for other sentence types, checksum mismatches and
/// sentences without a position fix.
pub fn parse_gga(sentence: &[u8]) -> Option<GpsFix> {
    let text = core::str::from_utf8(sentence).ok()?;
    let body = text.strip_prefix('$')?;
    let (body, checksum) = body.split_once('*')?;
    let expected = u8::from_str_radix(checksum.trim(), 16).ok()?;
    let actual = body.bytes().fold(0u8, |acc, b| acc ^ b);
    if actual != expected {
        warn!("GPS: checksum mismatch ({:02X} != {:02X})", actual, expected);
        return None;
    }

    let mut fields = body.split(',');
    let kind = fields.next()?;
    if !kind.ends_with("GGA") {
        return None;
    }
    let _utc = fields.next()?;
    let lat = coordinate(fields.next()?, fields.next()?, 'S', 90.0)?;
    let lon = coordinate(fields.next()?, fields.next()?, 'W', 180.0)?;
    let quality = fields.next()?;
    if quality.is_empty() || quality == "0" {
        debug!("GPS: no fix yet");
        return None;
    }
    let satellites = fields.next()?.parse().unwrap_or(0);
    let hdop = fields.next()?.parse().unwrap_or(0.0);
    let altitude = fields.next()?.parse().unwrap_or(0.0);

    Some(GpsFix {
        latitude: lat,
        longitude: lon,
        altitude,
        satellites,
        hdop,
    })
}

/// `dddmm.mmmm` plus hemisphere letter to signed decimal degrees.
/// Values outside `[0, limit]` degrees are rejected.
fn coordinate(value: &str, hemisphere: &str, negative: char, limit: f64) -> Option<f64> {
    let raw: f64 = value.parse().ok()?;
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let degrees = (raw / 100.0).trunc();
    let decimal = degrees + (raw - degrees * 100.0) / 60.0;
    if decimal > limit {
        return None;
    }
    Some(if hemisphere.starts_with(negative) { -decimal } else { decimal })
}
