//! Licence tiers.

use cue_types::LicenseStatus;
use std::time::Duration;

/// What a session is allowed to do, decided by the licence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LicenseTier {
    /// A valid licence: two-hour sessions.
    Licensed,
    /// No licence, or the check could not run. Also sizes the clock while a
    /// rejected key is on record.
    #[default]
    Demo,
}

impl LicenseTier {
    /// Session length with a licence.
    pub const LICENSED_DURATION: Duration = Duration::from_secs(2 * 60 * 60);
    /// Session length in demo mode.
    pub const DEMO_DURATION: Duration = Duration::from_secs(5 * 60);

    /// How long one session may run.
    pub fn session_duration(&self) -> Duration {
        match self {
            LicenseTier::Licensed => Self::LICENSED_DURATION,
            LicenseTier::Demo => Self::DEMO_DURATION,
        }
    }

    /// Status line while a session runs.
    pub fn running_label(&self) -> &'static str {
        match self {
            LicenseTier::Licensed => "Session Running",
            LicenseTier::Demo => "Demo Mode (5 min)",
        }
    }

    /// Status line once the countdown hits zero.
    pub fn expired_label(&self) -> &'static str {
        match self {
            LicenseTier::Licensed => "Session Expired",
            LicenseTier::Demo => "Demo Expired",
        }
    }
}

impl From<LicenseStatus> for LicenseTier {
    fn from(status: LicenseStatus) -> Self {
        match status {
            LicenseStatus::Valid => LicenseTier::Licensed,
            LicenseStatus::Invalid | LicenseStatus::Empty => LicenseTier::Demo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_licences_unlock_full_sessions() {
        assert_eq!(LicenseTier::from(LicenseStatus::Valid), LicenseTier::Licensed);
        assert_eq!(LicenseTier::from(LicenseStatus::Invalid), LicenseTier::Demo);
        assert_eq!(LicenseTier::from(LicenseStatus::Empty), LicenseTier::Demo);
    }

    #[test]
    fn durations() {
        assert_eq!(LicenseTier::Licensed.session_duration(), Duration::from_secs(7200));
        assert_eq!(LicenseTier::Demo.session_duration(), Duration::from_secs(300));
    }
}
