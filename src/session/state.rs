use crate::types::AnalysisResult;
use std::collections::BTreeSet;

/// Where a stream session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Uploading,
    Thinking { open_sections: BTreeSet<String> },
    Terminal(Terminal),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Complete,
    Error { message: String },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminal(_))
    }

    pub fn open_sections(&self) -> Option<&BTreeSet<String>> {
        match self {
            SessionState::Thinking { open_sections } => Some(open_sections),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Uploading => "uploading",
            SessionState::Thinking { .. } => "thinking",
            SessionState::Terminal(Terminal::Complete) => "complete",
            SessionState::Terminal(Terminal::Error { .. }) => "error",
        }
    }
}

/// What a caller gets back from one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(AnalysisResult),
    /// Server-reported or transport failure; `message` is what the user saw
    Failed { message: String },
    /// Aborted from outside before a terminal event; nothing was synthesized
    Cancelled,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed(_))
    }
}
