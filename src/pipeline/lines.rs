//! Line reassembly over text fragments.

/// Buffers fragments and yields complete newline-terminated lines.
///
/// The buffer never holds a full line: after every `feed`, it contains only the text
/// after the last `\n` seen so far.
#[derive(Debug, Default)]
pub struct LineReassembler {
    buf: String,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return every line it completed, in order, without the
    /// terminator. A trailing `\r` is dropped so CRLF framing behaves like LF.
    pub fn feed(&mut self, fragment: &str) -> Vec<String> {
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buf.push_str(fragment);

        let Some(last_newline) = self.buf.rfind('\n') else {
            return Vec::new();
        };
        let tail = self.buf.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buf, tail);

        let mut lines: Vec<String> = complete
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        // `complete` ends with '\n', so the last piece is always empty.
        lines.pop();
        lines
    }

    /// End of stream: hand back the unterminated tail, if any. Callers discard it.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }

    pub fn buffered(&self) -> &str {
        &self.buf
    }
}
