//! Streaming UTF-8 decoding (Bytes -> text fragments)
//!
//! Network chunks split multi-byte characters arbitrarily. The decoder carries a
//! dangling partial sequence over to the next call instead of emitting garbage, so the
//! concatenated output never depends on where the chunk boundaries fell.

use std::char::REPLACEMENT_CHARACTER;

/// Stateful UTF-8 decoder. Equivalent to a non-fatal `TextDecoder` with `stream: true`.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    /// Incomplete trailing sequence from the previous chunk (at most 3 bytes).
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk. Invalid bytes become U+FFFD; an incomplete trailing
    /// sequence is held back until more bytes arrive.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let mut input: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            joined = std::mem::take(&mut self.pending);
            &joined
        };

        let mut out = String::with_capacity(input.len());
        loop {
            match std::str::from_utf8(input) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT_CHARACTER);
                            input = &rest[bad..];
                        }
                        None => {
                            self.pending.extend_from_slice(rest);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream. A sequence that never completed decodes to one U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT_CHARACTER.to_string()
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
