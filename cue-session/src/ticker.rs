//! Background countdown ticks.

use crate::clock::SessionClock;
use crate::tier::LicenseTier;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Tick period of [`run_countdown`].
pub const TICK: Duration = Duration::from_secs(1);

/// One update from the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Time left in the session.
    Remaining(Duration),
    /// The session ran out. No ticks follow.
    Expired(LicenseTier),
}

/// Send the clock's remaining time every second until it expires.
///
/// Returns when the clock expires (after sending [`TimerTick::Expired`]),
/// when `cancel` fires, when the receiver is dropped, or right away if the
/// clock was never started.
pub async fn run_countdown(
    clock: SessionClock,
    tx: mpsc::Sender<TimerTick>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("countdown cancelled");
                return;
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let tick = if clock.is_expired(now) {
            TimerTick::Expired(clock.tier())
        } else if clock.is_running(now) {
            TimerTick::Remaining(clock.remaining(now))
        } else {
            tracing::debug!("countdown started on a stopped clock");
            return;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("countdown cancelled");
                return;
            }
            sent = tx.send(tick) => {
                if sent.is_err() {
                    tracing::debug!("countdown receiver dropped");
                    return;
                }
            }
        }
        if let TimerTick::Expired(tier) = tick {
            tracing::info!(?tier, "session expired");
            return;
        }
    }
}
