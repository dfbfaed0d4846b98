//! The small markdown dialect model answers use, rendered to HTML.
//!
//! Rules run in a fixed order. Fenced code and inline code are pulled out
//! into placeholders before any other rule sees the text, so nothing inside
//! code is ever interpreted; their contents are HTML-escaped and spliced
//! back in last.
//!
//! Prose is sanitized against an allowlist: only the tags this formatter
//! emits itself and well-formed character references pass through, so a
//! second pass over formatted output leaves it unchanged.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`{3,}[ \t]*([A-Za-z0-9_#+\-]+)?[ \t]*\n([\s\S]*?)\n?\s*`{3,}")
        .expect("fenced code pattern is valid")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern is valid"));

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern is valid"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").expect("heading pattern is valid"));

static TAG_OR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][^<>]*>|&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")
        .expect("tag pattern is valid")
});

static EMITTED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^</?(?:br|strong|code|pre|div|span)(?: class="[A-Za-z0-9_#+ \-]*")?(?: data-action="copy")?>$"#,
    )
    .expect("emitted tag pattern is valid")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x{E000}([CI])(\d+)\x{E001}").expect("placeholder pattern is valid")
});

// Private-use delimiters. Stripped from input, so user text can never
// forge a placeholder.
const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Where the formatted markup is going to be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatStyle {
    /// The main answer pane: code blocks get a copy button.
    #[default]
    Response,
    /// The compact conversation log.
    Conversation,
}

/// Configurable markdown-to-HTML formatter.
///
/// # Examples
///
/// ```
/// use cue_format::{FormatStyle, Formatter};
///
/// let html = Formatter::new(FormatStyle::Response).format("**Note:** use `a < b`");
/// assert_eq!(html, "<strong>Note:</strong> use <code>a &lt; b</code>");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    style: FormatStyle,
    escape_prose: bool,
}

impl Formatter {
    /// A formatter for `style` that sanitizes prose.
    pub fn new(style: FormatStyle) -> Self {
        Self {
            style,
            escape_prose: false,
        }
    }

    /// Escape all markup outside code spans, the formatter's own tags included.
    ///
    /// Use this for text that did not come from the model, such as the
    /// interviewer transcript. Output produced this way is not stable under
    /// a second pass, since the emitted tags would be escaped. Without it,
    /// prose goes through [`sanitize_prose`].
    pub fn escape_prose(mut self, on: bool) -> Self {
        self.escape_prose = on;
        self
    }

    /// Render `text` to HTML.
    pub fn format(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut code_blocks: Vec<String> = Vec::new();
        let mut inline_spans: Vec<String> = Vec::new();

        let text = normalize_line_endings(text).replace([OPEN, CLOSE], "");

        let text = FENCED_CODE.replace_all(&text, |caps: &Captures| {
            let language = caps.get(1).map_or("plaintext", |m| m.as_str());
            let code = escape_html(caps[2].trim_matches('\n'));
            let token = placeholder('C', code_blocks.len());
            code_blocks.push(self.code_block(language, &code));
            token
        });

        let text = INLINE_CODE.replace_all(&text, |caps: &Captures| {
            let token = placeholder('I', inline_spans.len());
            inline_spans.push(format!("<code>{}</code>", escape_html(&caps[1])));
            token
        });

        let text = if self.escape_prose {
            escape_html(&text)
        } else {
            sanitize_prose(&text)
        };

        let text = BOLD.replace_all(&text, "<strong>${1}</strong>");
        let text = HEADING.replace_all(&text, "");
        let text = text.replace('\n', "<br>");

        PLACEHOLDER
            .replace_all(&text, |caps: &Captures| {
                let slot = caps[2].parse::<usize>().ok();
                let restored = match &caps[1] {
                    "C" => slot.and_then(|i| code_blocks.get(i)),
                    _ => slot.and_then(|i| inline_spans.get(i)),
                };
                restored.cloned().unwrap_or_default()
            })
            .into_owned()
    }

    fn code_block(&self, language: &str, escaped_code: &str) -> String {
        match self.style {
            FormatStyle::Response => format!(
                "<div class=\"code-block\"><span class=\"copy-code-btn\" data-action=\"copy\">[copy]</span>\
                 <pre><code class=\"language-{language}\">{escaped_code}</code></pre></div>"
            ),
            FormatStyle::Conversation => format!(
                "<pre class=\"convo-code\"><code class=\"language-{language}\">{escaped_code}</code></pre>"
            ),
        }
    }
}

/// Render `text` with the default rules for `style`.
pub fn format_markdown(text: &str, style: FormatStyle) -> String {
    Formatter::new(style).format(text)
}

/// Collapse `\r\n` and lone `\r` into `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Escape `&`, `<` and `>` for use in element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape markup in prose, keeping the tags this formatter emits and
/// well-formed character references.
///
/// ```
/// use cue_format::sanitize_prose;
///
/// assert_eq!(sanitize_prose("<b>x</b> &amp; <br>"), "&lt;b&gt;x&lt;/b&gt; &amp; <br>");
/// assert_eq!(sanitize_prose("AT&T <img onerror=1>"), "AT&amp;T &lt;img onerror=1&gt;");
/// ```
pub fn sanitize_prose(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in TAG_OR_REFERENCE.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        let token = m.as_str();
        if token.starts_with('&') || EMITTED_TAG.is_match(token) {
            out.push_str(token);
        } else {
            out.push_str(&escape_html(token));
        }
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Escape text for use inside a double- or single-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn placeholder(kind: char, index: usize) -> String {
    format!("{OPEN}{kind}{index}{CLOSE}")
}
