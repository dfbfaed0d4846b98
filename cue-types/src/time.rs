//! Latency values as the backend reports them.
//!
//! The backend sends timings as fractional seconds (`"ttft": 0.83`). [`Seconds`]
//! keeps that wire shape (a bare JSON number) and carries the "reported"
//! rule used when a server value competes with a client measurement.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A latency in fractional seconds.
///
/// Serializes as a plain JSON number.
///
/// # Examples
///
/// ```
/// use cue_types::Seconds;
///
/// let s = Seconds::from_secs_f64(0.83);
/// assert!(s.is_reported());
/// assert_eq!(s.to_string(), "0.8s");
/// assert!(!Seconds::ZERO.is_reported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(f64);

impl Seconds {
    /// Zero seconds, also the "not reported" value.
    pub const ZERO: Self = Self(0.0);

    /// Create from fractional seconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    /// The value in fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Whether this value counts as a real measurement.
    ///
    /// Zero, negative and non-finite values mean "not reported".
    pub fn is_reported(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// Convert to `std::time::Duration`, clamping unreported values to zero.
    pub fn to_std(&self) -> Duration {
        if self.is_reported() {
            Duration::from_secs_f64(self.0)
        } else {
            Duration::ZERO
        }
    }
}

impl From<Duration> for Seconds {
    fn from(d: Duration) -> Self {
        Self(d.as_secs_f64())
    }
}

impl Default for Seconds {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.0)
    }
}
