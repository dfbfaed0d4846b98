//! Turning one SSE line into stream events.
//!
//! The backend writes each record as a single line:
//!
//! ```text
//! data: {"chunk": "Hel"}
//!
//! data: {"chunk": "lo"}
//!
//! data: {"done": true, "model": "gpt-4o", "ttft": 0.8, "total_time": 3.1,
//!        "response_cost": 0.0012, "usage": {"total_cost": 0.42}}
//! ```
//!
//! and `data: {"error": "..."}` when generation fails.

use cue_types::{Completion, Seconds, StreamEvent, Usage, decimal_from_json};
use serde_json::{Map, Value};

/// Prefix that marks an SSE data line.
pub const DATA_PREFIX: &str = "data: ";

/// What a single line amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank lines, comments, other SSE fields, `[DONE]`, and records that
    /// carry nothing this client uses.
    Ignored,
    /// A data line whose payload is not a JSON object. The stream goes on.
    Malformed(String),
    /// Events in the order they apply. A record holding both `chunk` and
    /// `done` yields the chunk first.
    Events(Vec<StreamEvent>),
}

/// Classify and decode one line.
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim_end_matches('\r');
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Ignored;
    };
    let payload = payload.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return LineOutcome::Ignored;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => return LineOutcome::Malformed(format!("invalid JSON: {e}")),
    };
    let Some(record) = value.as_object() else {
        return LineOutcome::Malformed("record is not a JSON object".into());
    };

    if let Some(message) = record.get("error").and_then(error_message) {
        return LineOutcome::Events(vec![StreamEvent::Error { message }]);
    }

    let mut events = Vec::new();
    if let Some(text) = record.get("chunk").and_then(Value::as_str) {
        if !text.is_empty() {
            events.push(StreamEvent::Chunk {
                text: text.to_string(),
            });
        }
    }
    if record.get("done").is_some_and(truthy) {
        events.push(StreamEvent::Done(completion(record)));
    }

    if events.is_empty() {
        tracing::debug!(payload, "record carries no chunk, done or error");
        LineOutcome::Ignored
    } else {
        LineOutcome::Events(events)
    }
}

fn completion(record: &Map<String, Value>) -> Completion {
    let seconds = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_f64)
            .map(Seconds::from_secs_f64)
    };
    Completion {
        model: record
            .get("model")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        ttft: seconds("ttft"),
        total_time: seconds("total_time"),
        response_cost: record.get("response_cost").and_then(decimal_from_json),
        usage: record.get("usage").and_then(Value::as_object).map(|usage| Usage {
            total_cost: usage.get("total_cost").and_then(decimal_from_json),
        }),
    }
}

// `{"error": "text"}` from the backend, `{"error": {"message": ...}}` from
// proxies in front of it. Falsy values mean no error.
fn error_message(value: &Value) -> Option<String> {
    if !truthy(value) {
        return None;
    }
    let message = match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => match obj.get("message").and_then(Value::as_str) {
            Some(m) => m.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    };
    Some(message)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
