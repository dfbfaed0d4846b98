//! Folding stream events into an answer.

use cue_format::{FormatStyle, Formatter};
use cue_types::{Completion, RenderSink, Seconds, StreamError, StreamEvent, StreamReport};
use std::time::Instant;

/// Whether the caller should keep feeding events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// More events may follow.
    Continue,
    /// A terminal record was seen; call [`StreamRenderer::finish`].
    Stop,
}

/// Accumulates one answer and its telemetry.
///
/// The raw text grows by appending each chunk verbatim and is handed to the
/// sink after every chunk. Markdown formatting runs once, in
/// [`finish`](StreamRenderer::finish).
///
/// ```
/// use cue_stream::{Flow, RecordingSink, StreamRenderer};
/// use cue_types::{Completion, StreamEvent};
/// use std::time::Instant;
///
/// let start = Instant::now();
/// let mut sink = RecordingSink::default();
/// let mut renderer = StreamRenderer::new("gpt-4o", start);
/// for text in ["Hel", "lo, ", "world"] {
///     let event = StreamEvent::Chunk { text: text.into() };
///     assert_eq!(renderer.apply(event, Instant::now(), &mut sink), Flow::Continue);
/// }
/// let done = StreamEvent::Done(Completion::default());
/// assert_eq!(renderer.apply(done, Instant::now(), &mut sink), Flow::Stop);
/// let report = renderer.finish(Instant::now(), &mut sink).unwrap();
/// assert_eq!(report.raw, "Hello, world");
/// ```
#[derive(Debug)]
pub struct StreamRenderer {
    requested_model: String,
    started: Instant,
    raw: String,
    client_ttft: Option<Seconds>,
    completion: Option<Completion>,
    failure: Option<String>,
    formatter: Formatter,
}

impl StreamRenderer {
    /// Start rendering an answer requested from `model` at `started`.
    pub fn new(model: impl Into<String>, started: Instant) -> Self {
        Self {
            requested_model: model.into(),
            started,
            raw: String::new(),
            client_ttft: None,
            completion: None,
            failure: None,
            formatter: Formatter::new(FormatStyle::Response),
        }
    }

    /// Use a different formatter for the final markup.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Apply one event observed at `now`.
    ///
    /// Events after a terminal one are dropped.
    pub fn apply<K>(&mut self, event: StreamEvent, now: Instant, sink: &mut K) -> Flow
    where
        K: RenderSink + ?Sized,
    {
        if self.is_stopped() {
            tracing::debug!("event after terminal record dropped");
            return Flow::Stop;
        }

        match event {
            StreamEvent::Chunk { text } => {
                if self.client_ttft.is_none() {
                    let ttft = Seconds::from(now.saturating_duration_since(self.started));
                    tracing::debug!(%ttft, "first chunk");
                    self.client_ttft = Some(ttft);
                    sink.on_first_chunk(ttft);
                }
                tracing::debug!(len = text.len(), "chunk");
                self.raw.push_str(&text);
                sink.on_chunk(&self.raw);
                Flow::Continue
            }
            StreamEvent::Done(completion) => {
                tracing::debug!(model = ?completion.model, "done record");
                self.completion = Some(completion);
                Flow::Stop
            }
            StreamEvent::Error { message } => {
                tracing::warn!(%message, "backend reported an error");
                self.failure = Some(message);
                Flow::Stop
            }
        }
    }

    /// Close the stream at `now` and build the report.
    ///
    /// The sink's `on_complete` is called only on success.
    pub fn finish<K>(self, now: Instant, sink: &mut K) -> Result<StreamReport, StreamError>
    where
        K: RenderSink + ?Sized,
    {
        if let Some(message) = self.failure {
            return Err(StreamError::Application(message));
        }
        if self.raw.trim().is_empty() {
            tracing::warn!(model = %self.requested_model, "stream finished without content");
            return Err(StreamError::NoContent {
                model: self.requested_model,
            });
        }

        let completion = self.completion.unwrap_or_default();
        let ttft = completion
            .ttft
            .filter(Seconds::is_reported)
            .or(self.client_ttft);
        let total_time = completion
            .total_time
            .filter(Seconds::is_reported)
            .unwrap_or_else(|| Seconds::from(now.saturating_duration_since(self.started)));

        let html = self.formatter.format(&self.raw);
        let report = StreamReport {
            requested_model: self.requested_model,
            model: completion.model,
            html,
            ttft,
            total_time,
            response_cost: completion.response_cost,
            total_cost: completion.usage.and_then(|u| u.total_cost),
            raw: self.raw,
        };

        tracing::info!(
            model = report.display_model(),
            ttft = ?report.ttft.map(|t| t.as_secs_f64()),
            total_time = report.total_time.as_secs_f64(),
            chars = report.raw.chars().count(),
            "answer complete"
        );
        sink.on_complete(&report);
        Ok(report)
    }

    /// Text accumulated so far.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Client-measured time to first chunk, once a chunk arrived.
    pub fn client_ttft(&self) -> Option<Seconds> {
        self.client_ttft
    }

    /// Whether a terminal record has been applied.
    pub fn is_stopped(&self) -> bool {
        self.completion.is_some() || self.failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use std::time::Duration;

    fn chunk(text: &str) -> StreamEvent {
        StreamEvent::Chunk { text: text.into() }
    }

    fn done(ttft: Option<f64>, total: Option<f64>) -> StreamEvent {
        StreamEvent::Done(Completion {
            model: Some("gpt-4o".into()),
            ttft: ttft.map(Seconds::from_secs_f64),
            total_time: total.map(Seconds::from_secs_f64),
            ..Completion::default()
        })
    }

    #[test]
    fn chunks_accumulate_verbatim_and_notify_sink() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("gpt-4o", start);
        for text in ["Hel", "lo, ", "world"] {
            assert_eq!(r.apply(chunk(text), start, &mut sink), Flow::Continue);
        }
        assert_eq!(r.apply(done(None, None), start, &mut sink), Flow::Stop);
        let report = r.finish(start, &mut sink).unwrap();

        assert_eq!(report.raw, "Hello, world");
        assert_eq!(report.html, "Hello, world");
        assert_eq!(sink.chunks, vec!["Hel", "Hello, ", "Hello, world"]);
        assert_eq!(sink.completed.as_ref(), Some(&report));
    }

    #[test]
    fn error_terminates_and_later_chunks_are_dropped() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("gpt-4o", start);
        r.apply(chunk("partial"), start, &mut sink);
        let flow = r.apply(
            StreamEvent::Error {
                message: "quota exceeded".into(),
            },
            start,
            &mut sink,
        );
        assert_eq!(flow, Flow::Stop);
        assert_eq!(r.apply(chunk("late"), start, &mut sink), Flow::Stop);
        assert_eq!(r.raw(), "partial");

        let err = r.finish(start, &mut sink).unwrap_err();
        assert!(matches!(err, StreamError::Application(ref m) if m == "quota exceeded"));
        assert!(sink.completed.is_none());
    }

    #[test]
    fn client_ttft_measured_at_first_chunk() {
        let start = Instant::now();
        let first = start + Duration::from_millis(250);
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("a"), first, &mut sink);
        r.apply(chunk("b"), first + Duration::from_secs(1), &mut sink);
        assert_eq!(r.client_ttft(), Some(Seconds::from_secs_f64(0.25)));
        assert_eq!(sink.first_chunk, Some(Seconds::from_secs_f64(0.25)));
    }

    #[test]
    fn positive_server_ttft_overrides_client() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("a"), start + Duration::from_millis(500), &mut sink);
        r.apply(done(Some(0.8), None), start, &mut sink);
        let report = r.finish(start, &mut sink).unwrap();
        assert_eq!(report.ttft, Some(Seconds::from_secs_f64(0.8)));
    }

    #[test]
    fn zero_or_absent_server_ttft_keeps_client_value() {
        for server in [Some(0.0), Some(-1.0), None] {
            let start = Instant::now();
            let mut sink = RecordingSink::default();
            let mut r = StreamRenderer::new("m", start);
            r.apply(chunk("a"), start + Duration::from_millis(500), &mut sink);
            r.apply(done(server, None), start, &mut sink);
            let report = r.finish(start, &mut sink).unwrap();
            assert_eq!(report.ttft, Some(Seconds::from_secs_f64(0.5)), "server={server:?}");
        }
    }

    #[test]
    fn total_time_prefers_positive_server_value() {
        let start = Instant::now();
        let end = start + Duration::from_secs(2);
        let mut sink = RecordingSink::default();

        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("a"), start, &mut sink);
        r.apply(done(None, Some(3.1)), end, &mut sink);
        assert_eq!(
            r.finish(end, &mut sink).unwrap().total_time,
            Seconds::from_secs_f64(3.1)
        );

        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("a"), start, &mut sink);
        r.apply(done(None, Some(0.0)), end, &mut sink);
        assert_eq!(
            r.finish(end, &mut sink).unwrap().total_time,
            Seconds::from_secs_f64(2.0)
        );
    }

    #[test]
    fn done_without_chunks_names_the_model() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("o1-mini", start);
        r.apply(done(Some(0.3), Some(0.4)), start, &mut sink);
        let err = r.finish(start, &mut sink).unwrap_err();
        assert!(matches!(err, StreamError::NoContent { ref model } if model == "o1-mini"));
        assert!(sink.completed.is_none());
    }

    #[test]
    fn whitespace_only_answer_is_no_content() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("gpt-4o", start);
        r.apply(chunk("\n\n "), start, &mut sink);
        r.apply(done(Some(0.2), Some(0.5)), start, &mut sink);
        assert_eq!(sink.latest(), "\n\n ");
        let err = r.finish(start, &mut sink).unwrap_err();
        assert!(matches!(err, StreamError::NoContent { ref model } if model == "gpt-4o"));
        assert!(sink.completed.is_none());
    }

    #[test]
    fn markup_in_answer_is_escaped() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("See <img src=x onerror=alert(1)> and **this**"), start, &mut sink);
        let report = r.finish(start, &mut sink).unwrap();
        assert!(!report.html.contains("<img"), "got: {}", report.html);
        assert_eq!(
            report.html,
            "See &lt;img src=x onerror=alert(1)&gt; and <strong>this</strong>"
        );
    }

    #[test]
    fn end_without_done_still_completes() {
        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("**hi**"), start, &mut sink);
        let report = r.finish(start + Duration::from_secs(1), &mut sink).unwrap();
        assert_eq!(report.html, "<strong>hi</strong>");
        assert_eq!(report.model, None);
        assert_eq!(report.display_model(), "m");
        assert_eq!(report.total_time, Seconds::from_secs_f64(1.0));
    }

    #[test]
    fn report_carries_costs() {
        use rust_decimal::Decimal;
        use std::str::FromStr;

        let start = Instant::now();
        let mut sink = RecordingSink::default();
        let mut r = StreamRenderer::new("m", start);
        r.apply(chunk("a"), start, &mut sink);
        r.apply(
            StreamEvent::Done(Completion {
                response_cost: Some(Decimal::from_str("0.0012").unwrap()),
                usage: Some(cue_types::Usage {
                    total_cost: Some(Decimal::from_str("0.42").unwrap()),
                }),
                ..Completion::default()
            }),
            start,
            &mut sink,
        );
        let report = r.finish(start, &mut sink).unwrap();
        assert_eq!(report.response_cost, Some(Decimal::from_str("0.0012").unwrap()));
        assert_eq!(report.total_cost, Some(Decimal::from_str("0.42").unwrap()));
    }
}
