//! Application state shared by every part of the overlay.

use crate::clock::SessionClock;
use crate::tier::LicenseTier;
use crate::ticker::{TimerTick, run_countdown};
use chrono::Utc;
use cue_format::ConversationEntry;
use cue_types::{AiRequest, CueConfig, LicenseStatus, SessionError, StreamReport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything the overlay knows about the current session.
///
/// Owned by the UI task and passed by reference to whatever needs it.
#[derive(Debug)]
pub struct AppContext {
    config: CueConfig,
    license: LicenseStatus,
    tier: LicenseTier,
    selected_model: String,
    session_created: bool,
    clock: SessionClock,
    conversation: Vec<ConversationEntry>,
    ticker: Option<CancellationToken>,
}

impl AppContext {
    /// Fresh context for the given licence check result.
    pub fn new(config: CueConfig, license: LicenseStatus) -> Self {
        let tier = LicenseTier::from(license);
        Self {
            selected_model: config.default_model.clone(),
            config,
            license,
            tier,
            session_created: false,
            clock: SessionClock::new(tier),
            conversation: Vec::new(),
            ticker: None,
        }
    }

    /// Static configuration.
    pub fn config(&self) -> &CueConfig {
        &self.config
    }

    /// Current licence tier.
    pub fn tier(&self) -> LicenseTier {
        self.tier
    }

    /// Apply a new licence check result.
    ///
    /// A running countdown keeps its length; the new tier applies from the
    /// next session start.
    pub fn apply_license(&mut self, license: LicenseStatus, now: Instant) {
        self.license = license;
        self.tier = LicenseTier::from(license);
        if !self.clock.is_running(now) {
            self.clock = SessionClock::new(self.tier);
        }
    }

    /// Model questions are sent to.
    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// Switch the model used for the next question. Blank names are ignored.
    pub fn select_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        if !model.trim().is_empty() {
            self.selected_model = model.trim().to_string();
        }
    }

    /// The session countdown.
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Whether a session has been set up.
    pub fn session_created(&self) -> bool {
        self.session_created
    }

    /// Result of the last licence check.
    pub fn license(&self) -> LicenseStatus {
        self.license
    }

    /// Mark the session as set up, with a stopped clock and an empty log.
    ///
    /// A key the backend rejected blocks setup until a valid key or none at
    /// all is applied; only a missing or uncheckable key runs in demo mode.
    pub fn create_session(&mut self) -> Result<(), SessionError> {
        if self.license == LicenseStatus::Invalid {
            return Err(SessionError::InvalidLicense);
        }
        self.stop_session();
        self.session_created = true;
        self.clock = SessionClock::new(self.tier);
        self.conversation.clear();
        Ok(())
    }

    /// Start the countdown.
    ///
    /// Returns `Ok(false)` when it was already running.
    pub fn start_session(&mut self, now: Instant) -> Result<bool, SessionError> {
        if !self.session_created {
            return Err(SessionError::NotCreated);
        }
        let started = self.clock.start(now);
        if started {
            tracing::info!(tier = ?self.tier, "session started");
        }
        Ok(started)
    }

    /// Start the countdown and a background task reporting it on `tx`.
    ///
    /// Any previous ticker is cancelled first. Must be called inside a
    /// tokio runtime.
    pub fn start_session_with_ticker(
        &mut self,
        now: Instant,
        tx: mpsc::Sender<TimerTick>,
    ) -> Result<JoinHandle<()>, SessionError> {
        self.start_session(now)?;
        self.cancel_ticker();
        let cancel = CancellationToken::new();
        self.ticker = Some(cancel.clone());
        Ok(tokio::spawn(run_countdown(self.clock, tx, cancel)))
    }

    /// Pause the session: the countdown and its ticker stop.
    pub fn stop_session(&mut self) {
        self.cancel_ticker();
        if self.clock.is_started() {
            tracing::info!("session paused");
        }
        self.clock.stop();
    }

    /// Tear the session down entirely.
    pub fn end_session(&mut self) {
        self.stop_session();
        self.session_created = false;
        self.conversation.clear();
    }

    /// Whether questions may be asked right now.
    pub fn is_active(&self, now: Instant) -> bool {
        self.session_created && self.clock.is_running(now)
    }

    /// Build the request for a question, if the session allows one.
    pub fn build_request(
        &self,
        transcript: &str,
        screenshot: Option<String>,
        now: Instant,
    ) -> Result<AiRequest, SessionError> {
        if !self.session_created {
            return Err(SessionError::NotCreated);
        }
        if !self.clock.is_running(now) {
            return Err(SessionError::Inactive);
        }
        AiRequest::new(
            transcript,
            screenshot,
            self.selected_model.clone(),
            self.config.role.clone(),
            self.config.save_to_context,
        )
        .ok_or(SessionError::EmptyPrompt)
    }

    /// Log a finished answer and return the new entry.
    pub fn record(&mut self, input: &str, report: &StreamReport) -> &ConversationEntry {
        let entry = ConversationEntry::from_report(input, report, Utc::now());
        tracing::debug!(model = ?entry.model, "conversation entry recorded");
        self.conversation.push(entry);
        &self.conversation[self.conversation.len() - 1]
    }

    /// The conversation log, oldest first.
    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    fn cancel_ticker(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
