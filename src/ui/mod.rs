//! Display view-model.
//!
//! The device loop never draws pixels. It builds a [`Frame`] describing what
//! the screen should show, and a [`DisplayPort`](crate::app::ports::DisplayPort)
//! adapter turns that into pixels ([`render::GraphicsDisplay`]) or log lines.

pub mod glyphs;
pub mod render;

use crate::channel::Channels;
use glyphs::Glyph;

/// Which screen the buttons drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Channels,
    Media,
}

/// Selection state of the local menu. Reset at boot, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiCursor {
    pub selected: usize,
    pub editing: bool,
    pub mode: UiMode,
}

impl Default for UiCursor {
    fn default() -> Self {
        Self { selected: 0, editing: false, mode: UiMode::Channels }
    }
}

impl UiCursor {
    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }

    /// Indices shown above and below the selection (wrapping).
    pub fn neighbours(&self, len: usize) -> (usize, usize) {
        if len == 0 {
            return (0, 0);
        }
        let up = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        (up, (self.selected + 1) % len)
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            UiMode::Channels => UiMode::Media,
            UiMode::Media => UiMode::Channels,
        };
    }
}

/// Connection summary shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    NoNetwork,
    NoBroker,
    Connected,
}

impl LinkStatus {
    pub fn from_links(network_up: bool, broker_up: bool) -> Self {
        match (network_up, broker_up) {
            (false, _) => Self::NoNetwork,
            (true, false) => Self::NoBroker,
            (true, true) => Self::Connected,
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            Self::NoNetwork => "Not Connected To WiFi",
            Self::NoBroker => "Not Connected To MQTT",
            Self::Connected => "Connected",
        }
    }
}

/// One row of the browsing menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuRow {
    pub label: &'static str,
    pub value: i32,
    pub glyph: Option<Glyph>,
}

/// Everything a display needs for one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Previous, selected and next channel plus the status line.
    Menu { rows: [MenuRow; 3], status: LinkStatus },
    /// Single channel being edited, shown as `label:value`.
    Edit { label: &'static str, value: i32 },
    /// The two auxiliary strings (title and artist).
    Media { top: &'a str, bottom: &'a str },
    /// Full-screen notice with the WiFi glyph while a link is being brought up.
    Linking { message: &'static str },
}

pub const CONNECTING_NETWORK: &str = "Connecting to WiFi..";
pub const CONNECTING_BROKER: &str = "Attempting MQTT Reconnection...";

impl<'a> Frame<'a> {
    /// Frame for the current cursor, or `None` when there is nothing to show.
    pub fn build(
        channels: &Channels,
        cursor: &UiCursor,
        aux: &'a [heapless::String<64>],
        status: LinkStatus,
    ) -> Option<Self> {
        if cursor.mode == UiMode::Media {
            let line = |i: usize| aux.get(i).map_or("", |s| s.as_str());
            return Some(Self::Media { top: line(0), bottom: line(1) });
        }
        let row = |i: usize| {
            channels.spec(i).map(|spec| MenuRow {
                label: spec.label,
                value: channels.value(i).unwrap_or(0),
                glyph: spec.glyph,
            })
        };
        let selected = row(cursor.selected)?;
        if cursor.editing {
            return Some(Self::Edit { label: selected.label, value: selected.value });
        }
        let (up, down) = cursor.neighbours(channels.len());
        Some(Self::Menu { rows: [row(up)?, selected, row(down)?], status })
    }
}
