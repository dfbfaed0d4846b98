//! Driving a response body through the renderer.

use crate::lines::SseLines;
use crate::parse::{LineOutcome, parse_line};
use crate::render::{Flow, StreamRenderer};
use cue_types::{RenderSink, StreamError, StreamEvent, StreamReport};
use futures::{Stream, StreamExt};
use std::time::Instant;

/// Decode a raw byte stream into stream events.
///
/// Reads may split lines and UTF-8 sequences anywhere. Malformed records
/// are logged and skipped. The stream ends right after the first terminal
/// event, or with a single `Err` if reading the body fails. A last line
/// without a trailing newline is still decoded at end of body.
pub fn sse_events<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut reads = std::pin::pin!(byte_stream);
        let mut lines = SseLines::new();

        loop {
            let (batch, eof) = match reads.next().await {
                Some(Ok(bytes)) => (lines.feed(bytes.as_ref()), false),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "response body failed mid-stream");
                    yield Err(StreamError::Network(Box::new(e)));
                    return;
                }
                None => (lines.finish(), true),
            };

            for line in batch {
                for event in events_from(&line) {
                    let terminal = event.is_terminal();
                    yield Ok(event);
                    if terminal {
                        return;
                    }
                }
            }

            if eof {
                break;
            }
        }
    }
}

/// Run a whole answer stream: decode, apply every event, and finish.
///
/// Every chunk reaches `sink` as it arrives; the formatted answer is
/// delivered once at the end. A body read failure aborts with
/// [`StreamError::Network`] and no completion is signalled.
pub async fn drive_stream<S, B, E, K>(
    byte_stream: S,
    mut renderer: StreamRenderer,
    mut sink: K,
) -> Result<StreamReport, StreamError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
    K: RenderSink,
{
    let events = sse_events(byte_stream);
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        if renderer.apply(event?, Instant::now(), &mut sink) == Flow::Stop {
            break;
        }
    }
    renderer.finish(Instant::now(), &mut sink)
}

fn events_from(line: &str) -> Vec<StreamEvent> {
    match parse_line(line) {
        LineOutcome::Ignored => Vec::new(),
        LineOutcome::Malformed(reason) => {
            tracing::warn!(%reason, line, "skipping malformed record");
            Vec::new()
        }
        LineOutcome::Events(events) => events,
    }
}
