//! Streaming UTF-8 decoding.

/// Decodes UTF-8 that arrives split at arbitrary byte boundaries.
///
/// A multi-byte sequence cut by a read boundary is held back until the
/// rest of it arrives. Bytes that can never form valid UTF-8 are replaced
/// with U+FFFD and logged.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// A decoder with nothing buffered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one read, returning all text that is complete so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        let mut start = 0;

        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    out.push_str(
                        std::str::from_utf8(&self.pending[start..valid_end]).unwrap_or_default(),
                    );
                    match e.error_len() {
                        Some(len) => {
                            tracing::warn!(bytes = len, "replacing invalid UTF-8 in stream");
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    /// Flush whatever is still buffered at end of stream.
    ///
    /// A truncated trailing sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        tracing::warn!(
            bytes = self.pending.len(),
            "stream ended inside a UTF-8 sequence"
        );
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }

    /// Whether bytes are held back waiting for the rest of a sequence.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(b"hello"), "hello");
        assert!(!d.has_pending());
        assert_eq!(d.finish(), "");
    }

    #[test]
    fn split_multibyte_is_held_back() {
        let bytes = "café €".as_bytes();
        // 'é' is two bytes, '€' is three.
        let mut d = Utf8StreamDecoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&d.decode(std::slice::from_ref(b)));
        }
        out.push_str(&d.finish());
        assert_eq!(out, "café €");
    }

    #[test]
    fn partial_sequence_waits_for_rest() {
        let euro = "€".as_bytes();
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(&euro[..2]), "");
        assert!(d.has_pending());
        assert_eq!(d.decode(&euro[2..]), "€");
        assert!(!d.has_pending());
    }

    #[test]
    fn invalid_bytes_become_replacement() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_tail_is_flushed_lossily() {
        let mut d = Utf8StreamDecoder::new();
        assert_eq!(d.decode(b"ok\xE2\x82"), "ok");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert!(!d.has_pending());
    }
}
