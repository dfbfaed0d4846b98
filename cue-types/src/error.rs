//! Error types for all cue crates.

use std::time::Duration;
use thiserror::Error;

/// Errors that end an answer stream.
///
/// Malformed records never appear here: they are logged and skipped.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading the response body failed (socket closed, reset, timeout).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend sent a record with an `error` field.
    #[error("{0}")]
    Application(String),

    /// The stream completed without producing any answer text.
    #[error("no response from model \"{model}\"")]
    NoContent {
        /// The model the caller asked for.
        model: String,
    },
}

impl StreamError {
    /// Text suitable for the answer pane when the stream fails.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::NoContent { model } => format!(
                "Error: No response from model \"{model}\".\n\n\
                 The model may have rejected the request. Try a different model \
                 or check the backend console for details."
            ),
            other => format!("Error: {other}\n\nCheck if the backend is running."),
        }
    }
}

/// Errors from calls against the local backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    // Retryable errors
    /// Connection refused, DNS failure and similar.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The request did not finish in time.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// The backend (or the model API behind it) is rate limiting.
    #[error("rate limited")]
    RateLimited,
    /// The backend answered 5xx.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    // Terminal errors
    /// 401 or 403 from the backend.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The endpoint does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// The backend answered, but not in a shape we understand.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The backend understood the request and said no.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Neither a transcript nor a screenshot was supplied.
    #[error("no transcript or screenshot to process")]
    EmptyPrompt,
    /// The answer stream failed after the request was accepted.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl BackendError {
    /// Whether retrying this request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited | Self::Unavailable(_)
        )
    }
}

/// Errors from session bookkeeping.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No session has been set up yet.
    #[error("create a session first")]
    NotCreated,
    /// The licence key was checked and rejected.
    #[error("please enter a valid license key")]
    InvalidLicense,
    /// The session exists but its timer is not running.
    #[error("session is not active")]
    Inactive,
    /// Neither a transcript nor a screenshot was supplied.
    #[error("no transcript or screenshot to process")]
    EmptyPrompt,
}

/// Errors from loading configuration.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something unusable.
    #[error("invalid value for {key}: {value:?}")]
    Invalid {
        /// The variable name.
        key: String,
        /// The rejected value.
        value: String,
    },
}
