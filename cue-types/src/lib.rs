#![deny(missing_docs)]
//! Shared vocabulary for the cue answer pipeline.
//!
//! Every other cue crate speaks in these types: the records streamed by the
//! backend ([`StreamEvent`]), the telemetry folded out of them
//! ([`StreamReport`]), the request body for `/ai/stream` ([`AiRequest`]),
//! the [`RenderSink`] that receives progressive updates, and the error enums
//! for each concern.

pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod sink;
pub mod time;

pub use api::{AiRequest, ApiKeyCheck, LicenseStatus, ModelInfo};
pub use config::CueConfig;
pub use error::{BackendError, ConfigError, SessionError, StreamError};
pub use event::{Completion, StreamEvent, StreamReport, Usage, decimal_from_json};
pub use sink::RenderSink;
pub use time::Seconds;
