#![deny(missing_docs)]
//! Incremental rendering of cue answer streams.
//!
//! The backend streams an answer as SSE `data: ` lines over a long-lived
//! HTTP response. This crate turns that body into a finished
//! [`StreamReport`](cue_types::StreamReport) in layers:
//!
//! - [`Utf8StreamDecoder`] keeps multi-byte characters intact across reads.
//! - [`LineBuffer`] (and [`SseLines`], which pairs it with the decoder)
//!   splits text into complete lines.
//! - [`parse_line`] decodes a line into [`StreamEvent`](cue_types::StreamEvent)s.
//! - [`StreamRenderer`] accumulates text and telemetry and notifies a
//!   [`RenderSink`](cue_types::RenderSink).
//! - [`drive_stream`] runs all of the above over an async byte stream.

pub mod decode;
pub mod drive;
pub mod lines;
pub mod parse;
pub mod render;
pub mod sink;

pub use decode::Utf8StreamDecoder;
pub use drive::{drive_stream, sse_events};
pub use lines::{LineBuffer, SseLines};
pub use parse::{DATA_PREFIX, LineOutcome, parse_line};
pub use render::{Flow, StreamRenderer};
pub use sink::{NullSink, RecordingSink};
