//! Incremental UTF-8 decoding and LF line framing.
//!
//! Chunk boundaries fall wherever the transport puts them, so a single
//! character may arrive split across two reads and a single line across
//! many. [`Utf8Decoder`] keeps the unfinished tail of a character between
//! calls; [`LineDecoder`] adds the carry-over text buffer and cuts complete
//! lines out of it.
//!
//! Malformed input never fails: each maximal invalid byte subpart becomes
//! one U+FFFD, matching what browsers' `TextDecoder` produces.

use std::collections::VecDeque;

/// Longest possible UTF-8 encoding of one scalar value.
const MAX_UTF8_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Utf8Decoder
// ---------------------------------------------------------------------------

/// Stateful UTF-8 decoder carrying an incomplete trailing sequence across
/// calls.
///
/// The leftover buffer is allocated once and reused for the lifetime of the
/// decoder.
#[derive(Debug)]
pub struct Utf8Decoder {
    partial: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            partial: Vec::with_capacity(MAX_UTF8_LEN),
        }
    }

    /// Decode `bytes`, appending the text to `out`.
    ///
    /// A trailing incomplete sequence is held back until the next call (or
    /// [`flush_into`](Self::flush_into)).
    pub fn decode_into(&mut self, bytes: &[u8], out: &mut String) {
        let bytes = if self.partial.is_empty() {
            bytes
        } else {
            self.complete_partial(bytes, out)
        };

        let mut chunks = bytes.utf8_chunks().peekable();
        while let Some(chunk) = chunks.next() {
            out.push_str(chunk.valid());
            let invalid = chunk.invalid();
            if invalid.is_empty() {
                continue;
            }
            if chunks.peek().is_none() && is_incomplete(invalid) {
                self.partial.extend_from_slice(invalid);
            } else {
                out.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }

    /// End of input: an unfinished sequence decodes to a single U+FFFD.
    pub fn flush_into(&mut self, out: &mut String) {
        if !self.partial.is_empty() {
            self.partial.clear();
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    /// Whether bytes of an unfinished character are buffered.
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    /// Drop any buffered bytes without emitting them.
    pub fn reset(&mut self) {
        self.partial.clear();
    }

    /// Feed bytes into the buffered sequence until it completes or breaks.
    ///
    /// Returns the unconsumed remainder of `bytes`.
    fn complete_partial<'a>(&mut self, mut bytes: &'a [u8], out: &mut String) -> &'a [u8] {
        while let Some((&byte, rest)) = bytes.split_first() {
            self.partial.push(byte);
            match std::str::from_utf8(&self.partial) {
                Ok(ch) => {
                    out.push_str(ch);
                    self.partial.clear();
                    return rest;
                }
                Err(err) if err.error_len().is_none() => bytes = rest,
                Err(_) => {
                    // `byte` does not continue the sequence; it is decoded afresh.
                    self.partial.clear();
                    out.push(char::REPLACEMENT_CHARACTER);
                    return bytes;
                }
            }
        }
        bytes
    }
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `bytes` is a valid but unfinished UTF-8 prefix.
fn is_incomplete(bytes: &[u8]) -> bool {
    matches!(std::str::from_utf8(bytes), Err(err) if err.error_len().is_none())
}

// ---------------------------------------------------------------------------
// LineDecoder
// ---------------------------------------------------------------------------

/// Incremental NDJSON line framer.
///
/// Owns the decode buffer of one stream: the partial character bytes and the
/// decoded text not yet terminated by LF. After every [`push`](Self::push)
/// the carry-over contains no LF.
#[derive(Debug, Default)]
pub struct LineDecoder {
    utf8: Utf8Decoder,
    carry: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk and append every line it completes to `out`.
    ///
    /// Returns the number of lines appended. Zero-length lines are dropped
    /// and a CR directly before the LF is stripped.
    pub fn push(&mut self, chunk: &[u8], out: &mut VecDeque<String>) -> usize {
        let scan_from = self.carry.len();
        self.utf8.decode_into(chunk, &mut self.carry);

        let Some(last_lf) = self.carry[scan_from..].rfind('\n').map(|i| i + scan_from) else {
            return 0;
        };

        let mut emitted = 0;
        for raw in self.carry[..last_lf].split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if !line.is_empty() {
                out.push_back(line.to_owned());
                emitted += 1;
            }
        }
        self.carry.drain(..=last_lf);
        emitted
    }

    /// End of stream: return the carry-over as the final line.
    ///
    /// Framed like every other line: one trailing CR is stripped and an
    /// empty result yields nothing.
    pub fn finish(&mut self) -> Option<String> {
        self.utf8.flush_into(&mut self.carry);
        let mut tail = std::mem::take(&mut self.carry);
        if tail.ends_with('\r') {
            tail.pop();
        }
        if tail.is_empty() {
            None
        } else {
            Some(tail)
        }
    }

    /// Discard all buffered state (used on cancellation).
    pub fn reset(&mut self) {
        self.utf8.reset();
        self.carry.clear();
    }

    /// Decoded text waiting for a terminator.
    pub fn carry(&self) -> &str {
        &self.carry
    }

    /// Whether anything at all is buffered.
    pub fn is_empty(&self) -> bool {
        self.carry.is_empty() && !self.utf8.has_partial()
    }

    /// Split into the byte decoder and carry-over text, for callers that
    /// continue decoding without line framing.
    pub fn into_parts(self) -> (Utf8Decoder, String) {
        (self.utf8, self.carry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_chunks(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = LineDecoder::new();
        let mut out = VecDeque::new();
        for chunk in chunks {
            decoder.push(chunk, &mut out);
            assert!(!decoder.carry().contains('\n'));
        }
        out.extend(decoder.finish());
        out.into_iter().collect()
    }

    #[test]
    fn test_every_two_and_three_way_split_reassembles() {
        let text = "héllo wörld\n{\"crab\":\"🦀\"}\nπ ≈ 3.14159\n末尾の行";
        let bytes = text.as_bytes();

        for i in 0..=bytes.len() {
            for j in i..=bytes.len() {
                let lines = decode_chunks(&[&bytes[..i], &bytes[i..j], &bytes[j..]]);
                assert_eq!(lines.join("\n"), text, "split at {i}/{j}");
            }
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let text = "ünïcödé\n🦀🦀\nend";
        let chunks: Vec<&[u8]> = text.as_bytes().chunks(1).collect();
        assert_eq!(decode_chunks(&chunks), vec!["ünïcödé", "🦀🦀", "end"]);
    }

    #[test]
    fn test_empty_lines_dropped() {
        assert_eq!(decode_chunks(&[b"a\n\n\nb"]), vec!["a", "b"]);
    }

    #[test]
    fn test_crlf_stripped_across_chunks() {
        assert_eq!(decode_chunks(&[b"one\r", b"\ntwo\r\n"]), vec!["one", "two"]);
    }

    #[test]
    fn test_bare_cr_lines_dropped() {
        assert_eq!(decode_chunks(&[b"\r\n\r\nx\r\n"]), vec!["x"]);
    }

    #[test]
    fn test_final_line_framed_like_the_rest() {
        assert_eq!(decode_chunks(&[b"a\n\r"]), vec!["a"]);
        assert_eq!(decode_chunks(&[b"a\ntail\r"]), vec!["a", "tail"]);
    }

    #[test]
    fn test_json_split_mid_token() {
        let lines = decode_chunks(&[b"{\"a\":1}\n{\"b\"", b":2}\n"]);
        assert_eq!(lines, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn test_no_trailing_line_when_terminated() {
        let mut decoder = LineDecoder::new();
        let mut out = VecDeque::new();
        assert_eq!(decoder.push(b"done\n", &mut out), 1);
        assert!(decoder.is_empty());
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_split_four_byte_char_is_held_back() {
        let crab = "🦀".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();

        decoder.decode_into(&crab[..1], &mut out);
        decoder.decode_into(&crab[1..3], &mut out);
        assert!(out.is_empty());
        assert!(decoder.has_partial());

        decoder.decode_into(&crab[3..], &mut out);
        assert_eq!(out, "🦀");
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_invalid_bytes_become_replacement() {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        decoder.decode_into(b"a\xFFb", &mut out);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_broken_sequence_across_chunks() {
        // E2 82 starts a three-byte char, then 'A' interrupts it.
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        decoder.decode_into(b"\xE2\x82", &mut out);
        decoder.decode_into(b"A", &mut out);
        assert_eq!(out, "\u{FFFD}A");
    }

    #[test]
    fn test_unfinished_sequence_at_end_flushes_replacement() {
        let lines = decode_chunks(&[b"ok\ntail\xF0\x9F"]);
        assert_eq!(lines, vec!["ok", "tail\u{FFFD}"]);
    }

    #[test]
    fn test_reset_discards_carry() {
        let mut decoder = LineDecoder::new();
        let mut out = VecDeque::new();
        decoder.push(b"half a li", &mut out);
        assert_eq!(decoder.carry(), "half a li");
        decoder.reset();
        assert!(decoder.is_empty());
        assert!(decoder.finish().is_none());
    }
}
