//! The session countdown.

use crate::tier::LicenseTier;
use std::time::Duration;
use tokio::time::Instant;

/// Countdown for one session.
///
/// Starting sets a deadline a full session length away. Stopping drops the
/// deadline, so the next start begins a fresh full session. All methods
/// take the current instant explicitly.
///
/// ```
/// use cue_session::{LicenseTier, SessionClock};
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let now = Instant::now();
/// let mut clock = SessionClock::new(LicenseTier::Demo);
/// assert_eq!(clock.display(now), "0:05:00");
/// clock.start(now);
/// assert_eq!(clock.display(now + Duration::from_secs(61)), "0:03:59");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    tier: LicenseTier,
    deadline: Option<Instant>,
}

impl SessionClock {
    /// A stopped clock sized for `tier`.
    pub fn new(tier: LicenseTier) -> Self {
        Self {
            tier,
            deadline: None,
        }
    }

    /// The tier that sized this clock.
    pub fn tier(&self) -> LicenseTier {
        self.tier
    }

    /// Full session length.
    pub fn duration(&self) -> Duration {
        self.tier.session_duration()
    }

    /// Start counting down from `now`.
    ///
    /// Returns `false`, changing nothing, when the clock is already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running(now) {
            return false;
        }
        self.deadline = Some(now + self.duration());
        true
    }

    /// Stop the countdown and forget the deadline.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is set, expired or not.
    pub fn is_started(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether a deadline is set and still in the future.
    pub fn is_running(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Whether the countdown ran out.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left. A stopped clock reports the full length.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self.duration(),
        }
    }

    /// Time left as `H:MM:SS`.
    pub fn display(&self, now: Instant) -> String {
        format_hms(self.remaining(now))
    }
}

/// Format a duration as `H:MM:SS`, dropping fractions of a second.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}
