//! Records carried on the `/ai/stream` event stream, and the summary of a
//! finished stream.

use crate::time::Seconds;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One decoded record from the answer stream.
///
/// `Done` and `Error` are terminal: nothing after them is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A piece of answer text, appended verbatim.
    Chunk {
        /// The text delta.
        text: String,
    },
    /// The backend finished the answer.
    Done(Completion),
    /// The backend reported a failure; processing stops here.
    Error {
        /// Message to surface to the user.
        message: String,
    },
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done(_) | StreamEvent::Error { .. })
    }
}

/// Telemetry attached to the terminal `done` record.
///
/// Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Model that actually produced the answer.
    pub model: Option<String>,
    /// Server-measured time to first token.
    pub ttft: Option<Seconds>,
    /// Server-measured total generation time.
    pub total_time: Option<Seconds>,
    /// Cost of this single answer.
    pub response_cost: Option<Decimal>,
    /// Running usage for the session.
    pub usage: Option<Usage>,
}

/// Running usage totals reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Accumulated API spend for the session.
    pub total_cost: Option<Decimal>,
}

/// Everything known about a stream once it completed successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamReport {
    /// The model the caller asked for.
    pub requested_model: String,
    /// The model the backend says it used, if reported.
    pub model: Option<String>,
    /// Accumulated answer text, exactly as streamed.
    pub raw: String,
    /// The answer after markdown formatting.
    pub html: String,
    /// Time to first chunk. Server value when reported, else client-measured.
    pub ttft: Option<Seconds>,
    /// Total time. Server value when reported, else client-measured.
    pub total_time: Seconds,
    /// Cost of this answer, if reported.
    pub response_cost: Option<Decimal>,
    /// Running session cost, if reported.
    pub total_cost: Option<Decimal>,
}

impl StreamReport {
    /// The model name to show: the one used, falling back to the one requested.
    pub fn display_model(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.requested_model)
    }
}

/// Read a decimal from a JSON number or numeric string.
///
/// Numbers are converted through their textual form, so `0.0012` stays
/// exactly `0.0012` instead of picking up binary float noise.
pub fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_variants() {
        assert!(!StreamEvent::Chunk { text: "a".into() }.is_terminal());
        assert!(StreamEvent::Done(Completion::default()).is_terminal());
        assert!(
            StreamEvent::Error {
                message: "x".into()
            }
            .is_terminal()
        );
    }

    #[test]
    fn event_serde_is_tagged() {
        let json = serde_json::to_value(StreamEvent::Chunk { text: "hi".into() }).unwrap();
        assert_eq!(json["type"], "chunk");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn decimal_from_number_keeps_text_precision() {
        let d = decimal_from_json(&json!(0.0012)).unwrap();
        assert_eq!(d, Decimal::from_str("0.0012").unwrap());
    }

    #[test]
    fn decimal_from_string_and_scientific() {
        assert_eq!(
            decimal_from_json(&json!("1.50")).unwrap(),
            Decimal::from_str("1.50").unwrap()
        );
        assert_eq!(
            decimal_from_json(&json!(1e-5)).unwrap(),
            Decimal::from_str("0.00001").unwrap()
        );
    }

    #[test]
    fn decimal_from_other_types_is_none() {
        assert!(decimal_from_json(&json!(null)).is_none());
        assert!(decimal_from_json(&json!(true)).is_none());
        assert!(decimal_from_json(&json!("abc")).is_none());
    }

    #[test]
    fn display_model_falls_back_to_requested() {
        let mut report = StreamReport {
            requested_model: "gpt-3.5-turbo".into(),
            model: None,
            raw: "x".into(),
            html: "x".into(),
            ttft: None,
            total_time: Seconds::ZERO,
            response_cost: None,
            total_cost: None,
        };
        assert_eq!(report.display_model(), "gpt-3.5-turbo");
        report.model = Some("gpt-4o".into());
        assert_eq!(report.display_model(), "gpt-4o");
    }
}
