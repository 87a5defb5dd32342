//! Device profiles.
//!
//! A profile is the static table that turns the generic device loop into a
//! concrete node: which channels exist, which topic each one owns, what values
//! it may hold, and what extras (media control, dial, GPS, heartbeat) the node
//! carries. Profiles are `'static` data and never change at runtime.
//!
//! | Profile        | Channels                                  | Extras                    |
//! |----------------|-------------------------------------------|---------------------------|
//! | `hall`         | light, fan, switch, brightness, temp, hum | display, media, aux text  |
//! | `lawn-sonar`   | 4 lights, 2 ultrasonic rangers            |                           |
//! | `lawn-control` | 4 lights, MQ-6 gas                        | rotary dial               |
//! | `gps`          | none                                      | GPS fix JSON, heartbeat   |

use crate::ui::glyphs::Glyph;

/// Upper bound on channels per profile (sizes the fixed-capacity state arrays).
pub const MAX_CHANNELS: usize = 8;
/// Upper bound on auxiliary string topics per profile.
pub const MAX_AUX: usize = 4;

/// When a locally sampled sensor value is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Publish every sample, changed or not.
    Always,
    /// Publish when `|new - last_published| >= threshold`.
    /// A threshold of 0 publishes on any change.
    OnChange { threshold: u32 },
}

impl PublishMode {
    /// Decide whether `reading` must be published given the last published value.
    pub fn should_publish(self, reading: i32, last_published: Option<i32>) -> bool {
        let Some(last) = last_published else {
            return true;
        };
        match self {
            Self::Always => true,
            Self::OnChange { threshold: 0 } => reading != last,
            Self::OnChange { threshold } => reading.abs_diff(last) >= threshold,
        }
    }
}

/// Value domain of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// 0 or 1.
    Toggle,
    /// Integer in `[0, max]`. `max == 100` marks a percentage channel.
    Bounded { max: u16 },
    /// Read-only locally. With a non-zero `interval_ms` it is sampled from
    /// local hardware and published; with 0 it is fed by the broker and only
    /// displayed.
    Sensor { publish: PublishMode, interval_ms: u32 },
}

impl ValueDomain {
    pub const fn is_sensor(self) -> bool {
        matches!(self, Self::Sensor { .. })
    }

    /// Sampled from local hardware rather than fed by the broker.
    pub const fn is_sampled(self) -> bool {
        matches!(self, Self::Sensor { interval_ms, .. } if interval_ms > 0)
    }
}

/// One independently addressable piece of device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    pub label: &'static str,
    /// Used for both the published state and inbound commands.
    pub topic: &'static str,
    pub domain: ValueDomain,
    pub glyph: Option<Glyph>,
}

/// Free-text topic (e.g. "now playing") shown on the media screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxSpec {
    pub topic: &'static str,
    /// Text shown until the first message arrives.
    pub placeholder: &'static str,
}

/// Rotary encoder dial publishing a setpoint to one of several topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialSpec {
    pub targets: &'static [&'static str],
    pub min: i32,
    pub max: i32,
    /// Quiet time after the last movement before the value is published.
    pub settle_ms: u32,
}

/// Monotonic counter published on a fixed period (liveness signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSpec {
    pub topic: &'static str,
    pub interval_ms: u32,
}

/// How the MQTT client identifier is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdPolicy {
    /// Use the string verbatim.
    Fixed(&'static str),
    /// Prefix followed by four lowercase hex digits derived from the MAC.
    MacSuffix(&'static str),
}

/// Longest client identifier the broker adapters accept.
pub const MAX_CLIENT_ID: usize = 48;

impl ClientIdPolicy {
    /// Build the identifier for a board with the given station MAC.
    pub fn resolve(self, mac: &[u8; 6]) -> heapless::String<MAX_CLIENT_ID> {
        use core::fmt::Write;
        let mut id = heapless::String::new();
        let written = match self {
            Self::Fixed(s) => id.push_str(s).map_err(|()| core::fmt::Error),
            Self::MacSuffix(prefix) => write!(id, "{}{:02x}{:02x}", prefix, mac[4], mac[5]),
        };
        if written.is_err() {
            // `DeviceProfile::validate` rejects ids this long.
            log::warn!("Profile: client id truncated to '{}'", id);
        }
        id
    }

    /// Length of the resolved identifier.
    pub const fn resolved_len(self) -> usize {
        match self {
            Self::Fixed(s) => s.len(),
            Self::MacSuffix(prefix) => prefix.len() + 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub client_id: ClientIdPolicy,
    pub channels: &'static [ChannelSpec],
    pub aux: &'static [AuxSpec],
    /// Playback-control topic for nodes with a media mode.
    pub media_topic: Option<&'static str>,
    pub dial: Option<DialSpec>,
    pub heartbeat: Option<HeartbeatSpec>,
    /// Topic for composite GPS fixes.
    pub gps_topic: Option<&'static str>,
    pub has_display: bool,
}

impl DeviceProfile {
    /// Every topic the node must (re-)subscribe to after a broker connect.
    /// Locally sampled channels are publish-only.
    pub fn subscriptions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.channels
            .iter()
            .filter(|c| !c.domain.is_sampled())
            .map(|c| c.topic)
            .chain(self.aux.iter().map(|a| a.topic))
    }

    /// Static sanity checks on the table.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.channels.len() > MAX_CHANNELS {
            return Err("too many channels");
        }
        if self.aux.len() > MAX_AUX {
            return Err("too many aux topics");
        }
        if self.client_id.resolved_len() > MAX_CLIENT_ID {
            return Err("client id too long");
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.topic.is_empty() {
                return Err("empty channel topic");
            }
            if let ValueDomain::Bounded { max: 0 } = ch.domain {
                return Err("bounded channel with max 0");
            }
            if self.channels[..i].iter().any(|other| other.topic == ch.topic) {
                return Err("duplicate channel topic");
            }
        }
        if let Some(dial) = self.dial {
            if dial.targets.is_empty() || dial.min > dial.max {
                return Err("invalid dial");
            }
        }
        if self.has_display && self.channels.is_empty() {
            return Err("display without channels");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Built-in profiles
// ---------------------------------------------------------------------------

const REMOTE_SENSOR: ValueDomain = ValueDomain::Sensor {
    publish: PublishMode::OnChange { threshold: 0 },
    interval_ms: 0,
};

const fn light(label: &'static str, topic: &'static str) -> ChannelSpec {
    ChannelSpec { label, topic, domain: ValueDomain::Toggle, glyph: Some(Glyph::Light) }
}

/// Desktop companion in the hall: OLED menu, three buttons plus a mode button.
pub static HALL: DeviceProfile = DeviceProfile {
    name: "hall",
    client_id: ClientIdPolicy::Fixed("hallNode"),
    channels: &[
        light("Light 1", "hall/light"),
        ChannelSpec {
            label: "Fan 1",
            topic: "hall/fan",
            domain: ValueDomain::Bounded { max: 100 },
            glyph: Some(Glyph::Fan),
        },
        ChannelSpec {
            label: "Switch 1",
            topic: "hall/switchboard",
            domain: ValueDomain::Toggle,
            glyph: Some(Glyph::Plug),
        },
        ChannelSpec {
            label: "Brightness",
            topic: "hall/brightness",
            domain: ValueDomain::Bounded { max: 100 },
            glyph: Some(Glyph::Brightness),
        },
        ChannelSpec {
            label: "Temperature",
            topic: "hall/temperature",
            domain: REMOTE_SENSOR,
            glyph: Some(Glyph::Ambient),
        },
        ChannelSpec {
            label: "Humidity",
            topic: "hall/humidity",
            domain: REMOTE_SENSOR,
            glyph: Some(Glyph::Ambient),
        },
    ],
    aux: &[
        AuxSpec { topic: "c/Song", placeholder: "SongName" },
        AuxSpec { topic: "c/Artist", placeholder: "Artist" },
    ],
    media_topic: Some("c/playbackcontrol"),
    dial: None,
    heartbeat: None,
    gps_topic: None,
    has_display: true,
};

/// Lawn node: four relay-driven lights and two ultrasonic rangers.
pub static LAWN_SONAR: DeviceProfile = DeviceProfile {
    name: "lawn-sonar",
    client_id: ClientIdPolicy::MacSuffix("ESP8266Client-"),
    channels: &[
        light("Light 1", "lawn/light1"),
        light("Light 2", "lawn/light2"),
        light("Light 3", "lawn/light3"),
        light("Light 4", "lawn/light4"),
        ChannelSpec {
            label: "Sonar 1",
            topic: "lawn/ultrasonic1",
            domain: ValueDomain::Sensor { publish: PublishMode::Always, interval_ms: 2_000 },
            glyph: None,
        },
        ChannelSpec {
            label: "Sonar 2",
            topic: "lawn/ultrasonic2",
            domain: ValueDomain::Sensor { publish: PublishMode::Always, interval_ms: 2_000 },
            glyph: None,
        },
    ],
    aux: &[],
    media_topic: None,
    dial: None,
    heartbeat: None,
    gps_topic: None,
    has_display: false,
};

/// Lawn control box: four lights, MQ-6 gas sensor, rotary dial.
pub static LAWN_CONTROL: DeviceProfile = DeviceProfile {
    name: "lawn-control",
    client_id: ClientIdPolicy::MacSuffix("ESP32Client-"),
    channels: &[
        light("Light 1", "lawn/light1"),
        light("Light 2", "lawn/light2"),
        light("Light 3", "lawn/light3"),
        light("Light 4", "lawn/light4"),
        ChannelSpec {
            label: "Gas",
            topic: "hall/gas",
            domain: ValueDomain::Sensor {
                publish: PublishMode::OnChange { threshold: 5 },
                interval_ms: 500,
            },
            glyph: None,
        },
    ],
    aux: &[],
    media_topic: None,
    dial: Some(DialSpec {
        targets: &["lawn/ultrasonic1", "lawn/ultrasonic2"],
        min: 1,
        max: 100,
        settle_ms: 500,
    }),
    heartbeat: None,
    gps_topic: None,
    has_display: false,
};

/// GPS tracker: publishes fixes and a 10 s heartbeat counter.
pub static GPS: DeviceProfile = DeviceProfile {
    name: "gps",
    client_id: ClientIdPolicy::Fixed("ESP32GPSClient"),
    channels: &[],
    aux: &[],
    media_topic: None,
    dial: None,
    heartbeat: Some(HeartbeatSpec { topic: "count", interval_ms: 10_000 }),
    gps_topic: Some("gps"),
    has_display: false,
};

pub static ALL: [&DeviceProfile; 4] = [&HALL, &LAWN_SONAR, &LAWN_CONTROL, &GPS];

/// Look up a built-in profile by name.
pub fn by_name(name: &str) -> Option<&'static DeviceProfile> {
    ALL.iter().copied().find(|p| p.name == name)
}
