//! Frame parsing (line -> StreamEvent)

use crate::types::StreamEvent;
use tracing::warn;

/// Prefix carried by every data frame.
pub const DEFAULT_DATA_PREFIX: &str = "data: ";

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// No data prefix: keep-alive blank line, `:` comment, or an unrelated field
    Ignored,
    Event(StreamEvent),
    /// Prefixed, but the payload is not a known event
    Malformed { payload: String, reason: String },
}

/// Filters lines to the data-prefixed subset and decodes the payload.
///
/// Never fails: a corrupted frame is reported and skipped so the rest of the session
/// survives.
#[derive(Debug, Clone)]
pub struct EventParser {
    prefix: String,
}

impl EventParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn classify(&self, line: &str) -> Frame {
        let Some(payload) = line.strip_prefix(self.prefix.as_str()) else {
            return Frame::Ignored;
        };
        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) => Frame::Event(event),
            Err(e) => Frame::Malformed {
                payload: payload.to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// Classify and log. Returns the event for well-formed data frames only.
    pub fn parse_line(&self, line: &str) -> Option<StreamEvent> {
        match self.classify(line) {
            Frame::Event(event) => Some(event),
            Frame::Malformed { payload, reason } => {
                log_malformed(&payload, &reason);
                None
            }
            Frame::Ignored => None,
        }
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PREFIX)
    }
}

pub(crate) fn log_malformed(payload: &str, reason: &str) {
    const MAX_LOGGED: usize = 200;
    let shown: String = payload.chars().take(MAX_LOGGED).collect();
    warn!(payload = %shown, reason, "skipping malformed stream frame");
}
