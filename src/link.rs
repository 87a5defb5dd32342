//! Non-blocking connection supervisor.
//!
//! One [`LinkSupervisor`] tracks one link (WiFi association or the broker
//! session). It is polled every loop iteration with the link's current
//! level, so a drop is noticed on the next tick no matter how it happened.
//! Retries use a fixed delay; there is no backoff and no retry cap once the
//! node has booted.

use crate::config::{BootPolicy, LinkTiming};
use crate::error::LinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Idle until `retry_at_ms`.
    Disconnected { retry_at_ms: u64 },
    /// An attempt is in flight and counts as failed after `deadline_ms`.
    Connecting { attempt: u32, deadline_ms: u64 },
    Connected,
}

/// Edge reported by [`LinkSupervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    Up,
    Down,
    Attempting { attempt: u32 },
    AttemptFailed { attempt: u32 },
    /// Boot policy exhausted; the node continues without this link.
    GaveUp { attempts: u32 },
}

pub struct LinkSupervisor {
    state: LinkState,
    timing: LinkTiming,
    boot: BootPolicy,
    /// Consecutive attempts since the link was last up.
    attempts: u32,
    ever_connected: bool,
    gave_up: bool,
}

impl LinkSupervisor {
    pub fn new(timing: LinkTiming, boot: BootPolicy) -> Self {
        Self {
            state: LinkState::Disconnected { retry_at_ms: 0 },
            timing,
            boot,
            attempts: 0,
            ever_connected: false,
            gave_up: false,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_up(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// The boot gate is open once the link has come up at least once or the
    /// boot policy has given up on it.
    pub fn boot_settled(&self) -> bool {
        self.ever_connected || self.gave_up
    }

    /// Advance the state machine.
    ///
    /// `is_up` is the link's live level. `connect` starts an attempt; it is
    /// only called when a retry is due, and an `Err` counts as an immediately
    /// failed attempt.
    pub fn poll(
        &mut self,
        now_ms: u64,
        is_up: bool,
        connect: impl FnOnce() -> Result<(), LinkError>,
    ) -> Option<LinkTransition> {
        match self.state {
            LinkState::Connected if is_up => None,
            LinkState::Connected => {
                self.state = LinkState::Disconnected { retry_at_ms: now_ms };
                Some(LinkTransition::Down)
            }
            _ if is_up => {
                self.state = LinkState::Connected;
                self.attempts = 0;
                self.ever_connected = true;
                Some(LinkTransition::Up)
            }
            LinkState::Connecting { attempt, deadline_ms } => {
                if now_ms < deadline_ms {
                    return None;
                }
                Some(self.fail(now_ms, attempt))
            }
            LinkState::Disconnected { retry_at_ms } => {
                if now_ms < retry_at_ms {
                    return None;
                }
                self.attempts = self.attempts.saturating_add(1);
                let attempt = self.attempts;
                match connect() {
                    Ok(()) => {
                        let deadline_ms = now_ms + u64::from(self.timing.attempt_timeout_ms);
                        self.state = LinkState::Connecting { attempt, deadline_ms };
                        Some(LinkTransition::Attempting { attempt })
                    }
                    Err(_) => Some(self.fail(now_ms, attempt)),
                }
            }
        }
    }

    /// Force the link down without polling (the broker session when the
    /// network underneath it drops).
    pub fn mark_down(&mut self, now_ms: u64) -> Option<LinkTransition> {
        match self.state {
            LinkState::Connected => {
                self.state = LinkState::Disconnected { retry_at_ms: now_ms };
                Some(LinkTransition::Down)
            }
            LinkState::Connecting { .. } => {
                self.state = LinkState::Disconnected { retry_at_ms: now_ms };
                None
            }
            LinkState::Disconnected { .. } => None,
        }
    }

    fn fail(&mut self, now_ms: u64, attempt: u32) -> LinkTransition {
        self.state = LinkState::Disconnected {
            retry_at_ms: now_ms + u64::from(self.timing.retry_delay_ms),
        };
        match self.boot {
            BootPolicy::GiveUpAfter(n) if !self.boot_settled() && attempt >= n => {
                self.gave_up = true;
                LinkTransition::GaveUp { attempts: attempt }
            }
            _ => LinkTransition::AttemptFailed { attempt },
        }
    }
}
