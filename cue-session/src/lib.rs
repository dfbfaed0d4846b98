#![deny(missing_docs)]
//! Session state for the cue overlay.
//!
//! [`AppContext`] is the state every overlay component shares: the
//! configuration, licence tier, selected model, session countdown and
//! conversation log. [`run_countdown`] reports the countdown from a
//! background task.

pub mod clock;
pub mod context;
pub mod ticker;
pub mod tier;

pub use clock::{SessionClock, format_hms};
pub use context::AppContext;
pub use ticker::{TICK, TimerTick, run_countdown};
pub use tier::LicenseTier;
