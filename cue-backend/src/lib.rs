#![deny(missing_docs)]
//! HTTP client for the local cue backend.
//!
//! [`BackendClient`] covers licence and API-key checks, the model list,
//! clearing conversation memory, and streaming answers from `/ai/stream`
//! through [`cue_stream::drive_stream`]. Failures are mapped to
//! [`BackendError`] by status code.

pub mod client;
pub(crate) mod error;

pub use client::BackendClient;

// Re-export the vocabulary callers need alongside the client
pub use cue_types::{AiRequest, BackendError, LicenseStatus, ModelInfo, StreamReport};
