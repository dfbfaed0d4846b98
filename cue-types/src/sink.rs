//! The consumer side of an answer stream.

use crate::event::StreamReport;
use crate::time::Seconds;

/// Receives progressive updates while an answer streams in.
///
/// All calls happen on the task that drives the stream, in order: zero or
/// more [`on_chunk`](RenderSink::on_chunk) calls, with
/// [`on_first_chunk`](RenderSink::on_first_chunk) just before the first one,
/// then a single [`on_complete`](RenderSink::on_complete) if the stream
/// finished with content. A failed stream gets no `on_complete`.
pub trait RenderSink {
    /// The raw accumulated answer so far, unformatted.
    fn on_chunk(&mut self, raw: &str);

    /// Client-measured time to the first chunk.
    fn on_first_chunk(&mut self, _ttft: Seconds) {}

    /// The finished, formatted answer.
    fn on_complete(&mut self, report: &StreamReport);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn on_chunk(&mut self, raw: &str) {
        (**self).on_chunk(raw);
    }

    fn on_first_chunk(&mut self, ttft: Seconds) {
        (**self).on_first_chunk(ttft);
    }

    fn on_complete(&mut self, report: &StreamReport) {
        (**self).on_complete(report);
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn on_chunk(&mut self, raw: &str) {
        (**self).on_chunk(raw);
    }

    fn on_first_chunk(&mut self, ttft: Seconds) {
        (**self).on_first_chunk(ttft);
    }

    fn on_complete(&mut self, report: &StreamReport) {
        (**self).on_complete(report);
    }
}
