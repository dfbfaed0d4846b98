//! Splitting decoded text into lines across reads.

use crate::decode::Utf8StreamDecoder;

/// Residual-line buffer.
///
/// Each pushed piece of text is appended to whatever was left over from the
/// previous push; every complete line is returned and the trailing fragment
/// is kept. Line terminators are `\n`, with a preceding `\r` removed.
#[derive(Debug, Default)]
pub struct LineBuffer {
    residual: String,
}

impl LineBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return the lines it completed.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        // The residual holds no newline, so only the new text is scanned.
        let mut from = self.residual.len();
        self.residual.push_str(text);
        let mut lines = Vec::new();
        while let Some(offset) = self.residual[from..].find('\n') {
            let pos = from + offset;
            let line = self.residual[..pos].trim_end_matches('\r').to_string();
            self.residual.drain(..=pos);
            lines.push(line);
            from = 0;
        }
        lines
    }

    /// Take the unterminated last line, if it holds anything.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.residual);
        let rest = rest.trim_end_matches('\r');
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    /// Bytes currently held as an incomplete line.
    pub fn residual_len(&self) -> usize {
        self.residual.len()
    }
}

/// Bytes in, complete lines out.
///
/// Combines a [`Utf8StreamDecoder`] with a [`LineBuffer`], so callers feed
/// raw reads from the response body.
#[derive(Debug, Default)]
pub struct SseLines {
    decoder: Utf8StreamDecoder,
    lines: LineBuffer,
}

impl SseLines {
    /// A fresh line splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read from the body.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(bytes);
        if text.is_empty() {
            return Vec::new();
        }
        self.lines.push(&text)
    }

    /// Flush the decoder and the residual line at end of stream.
    pub fn finish(&mut self) -> Vec<String> {
        let tail = self.decoder.finish();
        let mut out = self.lines.push(&tail);
        out.extend(self.lines.finish());
        out
    }
}
