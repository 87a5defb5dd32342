//! Display stand-in for headless boards and host runs.
//!
//! Implements [`DisplayPort`] by logging a one-line summary of each frame.

use log::debug;

use crate::app::ports::DisplayPort;
use crate::ui::Frame;

#[derive(Debug, Default)]
pub struct LogDisplay {
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, frame: &Frame<'_>) {
        self.frames = self.frames.wrapping_add(1);
        match frame {
            Frame::Menu { rows, status } => {
                debug!("UI | menu [{}] {} [{}] | {}", rows[0].label, rows[1].label, rows[2].label, status.text());
            }
            Frame::Edit { label, value } => debug!("UI | {}:{}", label, value),
            Frame::Media { top, bottom } => debug!("UI | media {} / {}", top, bottom),
            Frame::Linking { message } => debug!("UI | {}", message),
        }
    }
}
