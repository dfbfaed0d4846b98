//! Ready-made sinks.

use cue_types::{RenderSink, Seconds, StreamReport};

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn on_chunk(&mut self, _raw: &str) {}

    fn on_complete(&mut self, _report: &StreamReport) {}
}

/// Keeps every update it receives, for tests and headless callers.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// The raw buffer as passed to each `on_chunk`.
    pub chunks: Vec<String>,
    /// Client time to first chunk, if one arrived.
    pub first_chunk: Option<Seconds>,
    /// The final report, if the stream completed.
    pub completed: Option<StreamReport>,
}

impl RecordingSink {
    /// The latest raw buffer, or `""` before any chunk.
    pub fn latest(&self) -> &str {
        self.chunks.last().map_or("", String::as_str)
    }
}

impl RenderSink for RecordingSink {
    fn on_chunk(&mut self, raw: &str) {
        self.chunks.push(raw.to_string());
    }

    fn on_first_chunk(&mut self, ttft: Seconds) {
        self.first_chunk = Some(ttft);
    }

    fn on_complete(&mut self, report: &StreamReport) {
        self.completed = Some(report.clone());
    }
}
