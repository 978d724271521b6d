use std::char::REPLACEMENT_CHARACTER;

/// Incremental UTF-8 decoder for a body that arrives in arbitrary byte
/// blocks. A multi-byte character split across two blocks is held back
/// until the rest of it arrives; bytes that can never form a valid
/// character are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next block, returning whatever text is complete so far
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::new();
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                }
                Err(err) => {
                    let valid_end = start + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    start = valid_end;

                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            start += len;
                        }
                        // Truncated sequence at the end, wait for more bytes
                        None => break,
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    /// Flush at end of stream. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        REPLACEMENT_CHARACTER.to_string()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"hello "), "hello ");
        assert_eq!(decoder.decode(b"world"), "world");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decode_split_multibyte() {
        // "é" is 0xC3 0xA9, "🦀" is four bytes
        let text = "café 🦀!";
        let bytes = text.as_bytes();
        let mut decoder = Utf8StreamDecoder::new();

        let mut out = String::new();
        for byte in bytes {
            out.push_str(&decoder.decode(std::slice::from_ref(byte)));
        }
        out.push_str(&decoder.finish());
        assert_eq!(out, text);
    }

    #[test]
    fn test_holds_back_partial_character() {
        let crab = "🦀".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();

        assert_eq!(decoder.decode(&[b'a', crab[0], crab[1]]), "a");
        assert!(decoder.has_pending());
        assert_eq!(decoder.decode(&crab[2..]), "🦀");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_replaces_invalid_bytes() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\xC3("), "\u{FFFD}(");
    }

    #[test]
    fn test_finish_flushes_truncated_character() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"ok\xE2\x82"), "ok");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
