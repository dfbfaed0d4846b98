#![deny(missing_docs)]
//! Formatting for finished cue answers.
//!
//! [`format_markdown`] turns the model's markdown into the HTML the overlay
//! shows; the [`view`] module holds the typed pieces around it (cost,
//! model badge, conversation log entries).

pub mod markdown;
pub mod view;

pub use markdown::{
    FormatStyle, Formatter, escape_attr, escape_html, format_markdown, normalize_line_endings,
    sanitize_prose,
};
pub use view::{
    ConversationEntry, CostDisplay, CostTier, ModelBadge, SCREENSHOT_INPUT, clean_response,
    format_seconds,
};
