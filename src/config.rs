//! Node configuration parameters
//!
//! Everything the original boards compiled in as constants: credentials,
//! broker address, retry cadence, debounce interval and the inbound range
//! policy. Per-profile defaults come from [`NodeConfig::for_profile`]; a JSON
//! override document can be loaded with [`NodeConfig::from_json`].

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::DeviceProfile;

pub type Ssid = heapless::String<32>;
pub type Passphrase = heapless::String<64>;
pub type Hostname = heapless::String<64>;

/// How long the hall node lets one association run before giving up on it.
pub const HALL_BOOT_WINDOW_MS: u32 = 13_000;

/// What the node does if the access point cannot be joined at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootPolicy {
    /// Hold the loop until the network comes up.
    WaitForever,
    /// After this many failed attempts, run degraded while retrying.
    GiveUpAfter(u32),
}

/// Handling of inbound bounded-channel values outside `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundRangePolicy {
    /// Store whatever integer arrives (lenient parse, no range check).
    Accept,
    /// Drop the message.
    Reject,
    /// Clamp into `[0, max]`.
    Clamp,
}

/// How the debounce timestamp is shared between inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebounceMode {
    /// One timestamp for every button: near-simultaneous presses merge.
    Shared,
    /// One timestamp per button.
    PerInput,
}

/// Retry cadence for one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTiming {
    /// How long a started attempt may take before it counts as failed.
    pub attempt_timeout_ms: u32,
    /// Fixed delay between a failed attempt and the next one.
    pub retry_delay_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: Ssid,
    pub password: Passphrase,
    pub timing: LinkTiming,
    pub boot: BootPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: Hostname,
    pub port: u16,
    pub timing: LinkTiming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub debounce_ms: u32,
    pub debounce_mode: DebounceMode,
}

/// Complete runtime configuration of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub network: NetworkConfig,
    pub broker: BrokerConfig,
    pub input: InputConfig,
    pub inbound_range: InboundRangePolicy,
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                ssid: fixed("ConForNode1"),
                password: fixed("12345678"),
                timing: LinkTiming { attempt_timeout_ms: 10_000, retry_delay_ms: 500 },
                boot: BootPolicy::WaitForever,
            },
            broker: BrokerConfig {
                host: fixed("ec2-3-86-53-202.compute-1.amazonaws.com"),
                port: 1883,
                timing: LinkTiming { attempt_timeout_ms: 5_000, retry_delay_ms: 5_000 },
            },
            input: InputConfig { debounce_ms: 300, debounce_mode: DebounceMode::Shared },
            inbound_range: InboundRangePolicy::Reject,
        }
    }
}

impl NodeConfig {
    /// Defaults tuned to the board a profile describes.
    pub fn for_profile(profile: &DeviceProfile) -> Self {
        let mut cfg = Self::default();
        match profile.name {
            "hall" => {
                // One association window of 13 s (thirteen one-second status
                // checks), then run the menu offline; broker retried every 2 s.
                cfg.network.timing = LinkTiming {
                    attempt_timeout_ms: HALL_BOOT_WINDOW_MS,
                    retry_delay_ms: 0,
                };
                cfg.network.boot = BootPolicy::GiveUpAfter(1);
                cfg.broker.timing.retry_delay_ms = 2_000;
            }
            "lawn-sonar" => {
                cfg.broker.host = fixed("ec2-35-170-242-83.compute-1.amazonaws.com");
            }
            "gps" => {
                cfg.network.ssid = fixed("Node ");
                cfg.network.password = fixed("whyitellyou");
                cfg.broker.host = fixed("192.168.1.100");
            }
            _ => {}
        }
        cfg
    }

    /// Parse a full configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `mqtt://host:port` URL for the broker client.
    pub fn broker_url(&self) -> heapless::String<80> {
        let mut url = heapless::String::new();
        use core::fmt::Write;
        let _ = write!(url, "mqtt://{}:{}", self.broker.host, self.broker.port);
        url
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ssid = self.network.ssid.as_str();
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(ConfigError::Invalid("network.ssid"));
        }
        let pw = self.network.password.len();
        if pw != 0 && !(8..=64).contains(&pw) {
            return Err(ConfigError::Invalid("network.password"));
        }
        if self.network.timing.attempt_timeout_ms == 0 {
            return Err(ConfigError::Invalid("network.timing.attempt_timeout_ms"));
        }
        if self.network.boot == BootPolicy::GiveUpAfter(0) {
            return Err(ConfigError::Invalid("network.boot"));
        }
        if self.broker.host.is_empty() || !is_printable_ascii(&self.broker.host) {
            return Err(ConfigError::Invalid("broker.host"));
        }
        if self.broker.port == 0 {
            return Err(ConfigError::Invalid("broker.port"));
        }
        if self.broker.timing.attempt_timeout_ms == 0 {
            return Err(ConfigError::Invalid("broker.timing.attempt_timeout_ms"));
        }
        if self.input.debounce_ms == 0 {
            return Err(ConfigError::Invalid("input.debounce_ms"));
        }
        Ok(())
    }
}

/// Returns `true` if every byte of `s` is in `0x20..=0x7E`.
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Document is not valid JSON for [`NodeConfig`].
    Malformed,
    /// The named field failed its range check.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::Invalid(field) => write!(f, "invalid value for {}", field),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Malformed => Self::Config("malformed config document"),
            ConfigError::Invalid(field) => Self::Config(field),
        }
    }
}
