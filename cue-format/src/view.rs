//! Typed view-model for everything the overlay shows around an answer.
//!
//! Each piece is plain data plus a `render_html` that escapes whatever it
//! interpolates, so callers never assemble markup from strings themselves.

use crate::markdown::{FormatStyle, Formatter, escape_attr, escape_html};
use chrono::{DateTime, Local, Utc};
use cue_types::{Seconds, StreamReport};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

static MODEL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Model Used:.*\]").expect("model tag pattern is valid"));

/// Input label used when only a screenshot was sent.
pub const SCREENSHOT_INPUT: &str = "(screenshot analysis)";

/// Colour band for the running API cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    /// Under $0.10.
    Low,
    /// $0.10 up to $0.50.
    Medium,
    /// $0.50 and above.
    High,
}

impl CostTier {
    /// Classify a running cost.
    pub fn for_amount(amount: Decimal) -> Self {
        if amount < Decimal::new(10, 2) {
            CostTier::Low
        } else if amount < Decimal::new(50, 2) {
            CostTier::Medium
        } else {
            CostTier::High
        }
    }

    /// CSS class for the tier.
    pub fn css_class(&self) -> &'static str {
        match self {
            CostTier::Low => "cost-low",
            CostTier::Medium => "cost-medium",
            CostTier::High => "cost-high",
        }
    }

    /// Text colour for the tier.
    pub fn color(&self) -> &'static str {
        match self {
            CostTier::Low => "rgba(120, 200, 180, 0.85)",
            CostTier::Medium => "rgba(200, 170, 120, 0.85)",
            CostTier::High => "rgba(200, 130, 130, 0.85)",
        }
    }
}

/// The running API cost as shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostDisplay {
    /// The cost in dollars.
    pub amount: Decimal,
    /// `42.00¢` under a dollar, `$1.25` from a dollar up.
    pub label: String,
    /// Colour band.
    pub tier: CostTier,
}

impl CostDisplay {
    /// Build the display for a running cost in dollars.
    pub fn new(amount: Decimal) -> Self {
        let label = if amount < Decimal::ONE {
            format!("{}¢", two_places(amount * Decimal::ONE_HUNDRED))
        } else {
            format!("${}", two_places(amount))
        };
        Self {
            amount,
            label,
            tier: CostTier::for_amount(amount),
        }
    }

    /// Markup for the status bar.
    pub fn render_html(&self) -> String {
        format!(
            "<span class=\"api-cost {}\">{}</span>",
            self.tier.css_class(),
            escape_html(&self.label)
        )
    }
}

/// Signature line under a finished answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBadge {
    /// Model name, upper-cased.
    pub display_name: String,
    /// ` (0.8s START / 3.1s TOTAL)`, ` (0.8s)` or empty.
    pub timing: String,
}

impl ModelBadge {
    /// Build a badge from the model name and timings.
    pub fn new(model: &str, ttft: Option<Seconds>, total_time: Option<Seconds>) -> Self {
        Self {
            display_name: model.to_uppercase(),
            timing: timing_suffix(ttft, total_time, ('(', ')')),
        }
    }

    /// Badge for a finished stream, or `None` when the backend named no model.
    pub fn for_report(report: &StreamReport) -> Option<Self> {
        report
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| Self::new(m, report.ttft, Some(report.total_time)))
    }

    /// Plain-text form.
    pub fn text(&self) -> String {
        format!("{}{}", self.display_name, self.timing)
    }

    /// Markup for the answer footer.
    pub fn render_html(&self) -> String {
        format!(
            "<div class=\"model-signature\"><span class=\"model-dash\">&#8212;</span>\
             <span class=\"model-name\">{}</span></div>",
            escape_html(&self.text())
        )
    }
}

/// One question/answer pair in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// What was asked.
    pub input: String,
    /// The answer, cleaned up for the log.
    pub response: String,
    /// Model that answered, if reported.
    pub model: Option<String>,
    /// Time to first token.
    pub ttft: Option<Seconds>,
    /// Total answer time.
    pub total_time: Option<Seconds>,
    /// Cost of this answer.
    pub cost: Option<Decimal>,
    /// When the answer completed.
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    /// Capture a finished stream into the log.
    pub fn from_report(input: &str, report: &StreamReport, timestamp: DateTime<Utc>) -> Self {
        let input = input.trim();
        Self {
            input: if input.is_empty() {
                SCREENSHOT_INPUT.to_string()
            } else {
                input.to_string()
            },
            response: clean_response(&report.raw),
            model: report.model.clone().filter(|m| !m.is_empty()),
            ttft: report.ttft,
            total_time: Some(report.total_time),
            cost: report.response_cost,
            timestamp,
        }
    }

    /// Heading for the answer side: `AI (GPT-4O) [0.8s START / 3.1s TOTAL]`.
    pub fn label(&self) -> String {
        let mut label = String::from("AI");
        if let Some(model) = &self.model {
            label.push_str(&format!(" ({})", model.to_uppercase()));
        }
        label.push_str(&timing_suffix(self.ttft, self.total_time, ('[', ']')));
        label
    }

    /// Local wall-clock time of the entry, 24-hour `HH:MM`.
    pub fn time_of_day(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }

    /// Markup for the conversation log.
    pub fn render_html(&self) -> String {
        let formatter = Formatter::new(FormatStyle::Conversation).escape_prose(true);
        let time = escape_html(&self.time_of_day());
        let cost = self.cost.unwrap_or(Decimal::ZERO);
        let ttft = self.ttft.unwrap_or_default().as_secs_f64();
        let total = self.total_time.unwrap_or_default().as_secs_f64();
        format!(
            "<div class=\"convo-pair\" data-cost=\"{cost}\" data-response-time=\"{ttft}\" \
             data-total-time=\"{total}\" data-timestamp=\"{stamp}\">\
             <div class=\"convo-input\"><strong class=\"convo-label\">Input</strong> \
             <span class=\"convo-time\">{time}</span><br>{input}</div>\
             <div class=\"convo-response\"><strong class=\"convo-label\">{label}</strong> \
             <span class=\"convo-time\">{time}</span><br>{response}</div></div>",
            stamp = escape_attr(&self.timestamp.to_rfc3339()),
            input = formatter.format(&self.input),
            label = escape_html(&self.label()),
            response = formatter.format(&self.response),
        )
    }
}

/// Tidy an answer for the conversation log.
///
/// Runs of three or more newlines collapse to one, the first
/// `[Model Used: ...]` tag is dropped and the result is trimmed.
pub fn clean_response(text: &str) -> String {
    let collapsed = BLANK_RUNS.replace_all(text, "\n");
    MODEL_TAG.replacen(&collapsed, 1, "").trim().to_string()
}

/// A latency as shown in badges and labels: one decimal and `s`.
pub fn format_seconds(value: Seconds) -> String {
    format!("{:.1}s", value.as_secs_f64())
}

fn timing_suffix(ttft: Option<Seconds>, total: Option<Seconds>, (open, close): (char, char)) -> String {
    let ttft = ttft.filter(Seconds::is_reported).map(format_seconds);
    let total = total.filter(Seconds::is_reported).map(format_seconds);
    match (ttft, total) {
        (Some(t), Some(tt)) => format!(" {open}{t} START / {tt} TOTAL{close}"),
        (Some(t), None) => format!(" {open}{t}{close}"),
        _ => String::new(),
    }
}

fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
