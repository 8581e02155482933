//! 流水线处理模块：将分块的 HTTP 响应体还原为有序的流事件。
//!
//! # Stream Ingestion Pipeline
//!
//! Turns a chunked HTTP response body into an ordered sequence of [`StreamEvent`]s.
//! Chunk boundaries are arbitrary: they may fall inside a multi-byte character, inside
//! a JSON payload, or between the `\r` and `\n` of a line terminator. None of that is
//! visible downstream.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Raw Bytes → Utf8ChunkDecoder → LineReassembler → EventParser → StreamEvent
//!     │              │                  │                │
//!   HTTP        stateful UTF-8     newline framing,   `data: ` filter,
//!   body        (carries partial   tail carried       malformed frames
//!               sequences)         across reads       logged + skipped
//! ```
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`FrameReader`] | Synchronous composition of all three stages |
//! | [`Decoder`] | Trait for async stream decoding |
//! | [`SseEventDecoder`] | `Decoder` over a byte stream, built on [`FrameReader`] |
//!
//! ## Example
//!
//! ```rust
//! use property_risk_stream::pipeline::FrameReader;
//! use property_risk_stream::types::StreamEvent;
//!
//! let mut reader = FrameReader::new();
//! assert!(reader.feed(b"data: {\"typ").is_empty());
//! let events = reader.feed(b"e\":\"status\",\"message\":\"go\"}\n");
//! assert_eq!(events, vec![StreamEvent::Status { message: "go".into() }]);
//! ```

pub mod decode;
pub mod lines;
pub mod parse;

#[cfg(test)]
mod tests;

pub use decode::Utf8ChunkDecoder;
pub use lines::LineReassembler;
pub use parse::{EventParser, Frame, DEFAULT_DATA_PREFIX};

use crate::types::StreamEvent;
use crate::{BoxStream, PipeResult};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::collections::VecDeque;
use tracing::warn;

/// Decoder trait for stream decoding
#[async_trait::async_trait]
pub trait Decoder: Send + Sync {
    /// Decode a byte stream into stream events
    async fn decode_stream(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> PipeResult<BoxStream<'static, StreamEvent>>;
}

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid frame prefix {prefix:?}{}", .hint.as_ref().map(|h| format!("\n💡 Hint: {}", h)).unwrap_or_default())]
    InvalidPrefix { prefix: String, hint: Option<String> },
}

impl PipelineError {
    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        if let PipelineError::InvalidPrefix {
            hint: ref mut slot, ..
        } = self
        {
            *slot = Some(hint.into());
        }
        self
    }
}

/// Check that a data prefix can ever match a reassembled line.
pub fn validate_prefix(prefix: &str) -> Result<(), PipelineError> {
    if prefix.is_empty() {
        return Err(PipelineError::InvalidPrefix {
            prefix: String::new(),
            hint: None,
        }
        .with_hint("an empty prefix matches blank separator lines; use e.g. \"data: \""));
    }
    if prefix.contains('\n') || prefix.contains('\r') {
        return Err(PipelineError::InvalidPrefix {
            prefix: prefix.to_string(),
            hint: None,
        }
        .with_hint("lines never contain line terminators; use e.g. \"data: \""));
    }
    Ok(())
}

/// Bytes in, events out. Holds all per-connection decode state.
#[derive(Debug)]
pub struct FrameReader {
    chars: Utf8ChunkDecoder,
    lines: LineReassembler,
    parser: EventParser,
    malformed: usize,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::with_parser(EventParser::default())
    }

    pub fn with_parser(parser: EventParser) -> Self {
        Self {
            chars: Utf8ChunkDecoder::new(),
            lines: LineReassembler::new(),
            parser,
            malformed: 0,
        }
    }

    /// Decode one network chunk and return the events it completed, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let text = self.chars.decode(chunk);
        let lines = self.lines.feed(&text);
        self.parse_lines(lines)
    }

    /// End of stream. Flushes the decoder; an unterminated tail is discarded, since a
    /// well-formed stream always ends its frames with a newline.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let text = self.chars.finish();
        let lines = self.lines.feed(&text);
        let events = self.parse_lines(lines);
        if let Some(tail) = self.lines.finish() {
            if !tail.trim().is_empty() {
                warn!(
                    bytes = tail.len(),
                    "discarding unterminated data at end of stream"
                );
            }
        }
        events
    }

    /// Number of prefixed frames skipped so far because they did not decode.
    pub fn malformed_frames(&self) -> usize {
        self.malformed
    }

    fn parse_lines(&mut self, lines: Vec<String>) -> Vec<StreamEvent> {
        let mut events = Vec::with_capacity(lines.len());
        for line in lines {
            match self.parser.classify(&line) {
                Frame::Event(event) => events.push(event),
                Frame::Malformed { payload, reason } => {
                    self.malformed += 1;
                    parse::log_malformed(&payload, &reason);
                }
                Frame::Ignored => {}
            }
        }
        events
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Event-stream decoder over an async byte stream.
///
/// This is a format decoder only; terminal-event handling lives in
/// [`crate::session::StreamSession`].
pub struct SseEventDecoder {
    prefix: String,
}

impl SseEventDecoder {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_DATA_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, PipelineError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { prefix })
    }
}

impl Default for SseEventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Decoder for SseEventDecoder {
    async fn decode_stream(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> PipeResult<BoxStream<'static, StreamEvent>> {
        let reader = FrameReader::with_parser(EventParser::new(self.prefix.clone()));

        // Events completed by one chunk are queued and handed out one by one before the
        // next chunk is pulled.
        let stream = stream::unfold(
            (input, reader, VecDeque::new(), false),
            |(mut input, mut reader, mut queue, mut done)| async move {
                loop {
                    if let Some(event) = queue.pop_front() {
                        return Some((Ok(event), (input, reader, queue, done)));
                    }
                    if done {
                        return None;
                    }

                    match input.next().await {
                        Some(Ok(bytes)) => queue.extend(reader.feed(&bytes)),
                        Some(Err(e)) => {
                            done = true;
                            return Some((Err(e), (input, reader, queue, done)));
                        }
                        None => {
                            queue.extend(reader.finish());
                            done = true;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}
