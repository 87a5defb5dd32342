//! Unified error types for the HomeNode firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! device loop's error handling uniform. All variants are `Copy` so they can
//! be passed through the loop and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A network or broker link operation failed.
    Link(LinkError),
    /// A sensor could not be read.
    Sensor(SensorError),
    /// An inbound or outbound payload could not be encoded/decoded.
    Codec(CodecError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A transfer on a peripheral bus (I2C, UART) failed.
    Bus(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Bus(msg) => write!(f, "bus: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The access point could not be joined.
    NetworkUnavailable,
    /// The broker refused or dropped the session.
    BrokerUnavailable,
    /// Operation requires a live broker session.
    NotConnected,
    /// SUBSCRIBE was rejected or could not be queued.
    SubscribeFailed,
    /// PUBLISH could not be queued.
    PublishFailed,
    /// Topic or payload exceeds the fixed buffer capacity.
    Oversized,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(f, "network unavailable"),
            Self::BrokerUnavailable => write!(f, "broker unavailable"),
            Self::NotConnected => write!(f, "not connected"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::Oversized => write!(f, "topic or payload too large"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// GPIO read or write returned an error.
    GpioFailed,
    /// Sensor is not fitted on this node.
    NotFitted,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::NotFitted => write!(f, "sensor not fitted"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload is not valid UTF-8.
    NotUtf8,
    /// Payload is not one of the toggle tokens "0" / "1".
    NotToggle,
    /// Payload is not a decimal integer.
    NotInteger,
    /// Integer is outside the channel's `[0, max]` range.
    OutOfRange,
    /// Encoded payload does not fit the output buffer.
    BufferFull,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "payload is not UTF-8"),
            Self::NotToggle => write!(f, "expected \"0\" or \"1\""),
            Self::NotInteger => write!(f, "expected a decimal integer"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::BufferFull => write!(f, "payload buffer full"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
