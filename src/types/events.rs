//! Stream events emitted by the analysis endpoint, one per `data:` frame.

use super::analysis::{AnalysisResult, ThinkingTrace};
use super::lenient;
use serde::{Deserialize, Serialize};

/// Decoded stream event. The wire discriminator is the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Informational progress text
    Status {
        #[serde(deserialize_with = "lenient::string")]
        message: String,
    },

    /// Analysis phase begins; resets the open sections
    ThinkingStart {
        #[serde(
            default,
            deserialize_with = "lenient::opt_string",
            skip_serializing_if = "Option::is_none"
        )]
        message: Option<String>,
    },

    /// A named subsection has begun
    ThinkingSection {
        #[serde(deserialize_with = "lenient::string")]
        section: String,
        #[serde(default, deserialize_with = "lenient::string")]
        message: String,
    },

    /// A named subsection finished
    ThinkingResult {
        #[serde(deserialize_with = "lenient::string")]
        section: String,
        #[serde(default, deserialize_with = "lenient::or_default")]
        trace: ThinkingTrace,
    },

    /// Terminal success. `data` may be missing or null on a misbehaving server.
    Complete {
        #[serde(default)]
        data: Option<AnalysisResult>,
    },

    /// Terminal failure
    Error {
        #[serde(default, deserialize_with = "lenient::string")]
        message: String,
    },
}

impl StreamEvent {
    /// Returns true if this event ends the session (`complete` or `error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Wire name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::ThinkingStart { .. } => "thinking_start",
            Self::ThinkingSection { .. } => "thinking_section",
            Self::ThinkingResult { .. } => "thinking_result",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}
