//! 渲染输出模块：会话状态机写入的可替换渲染目标。
//!
//! # Render Sinks
//!
//! The stream session never draws anything itself; it mutates a keyed node tree through
//! the [`RenderSink`] trait. A browser page, a terminal, or a test harness can sit
//! behind it.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RenderSink`] | Trait: replace node content, append child, query by key |
//! | [`Content`] | What a node shows |
//! | [`NoopSink`] | Discards everything (structure-unaware) |
//! | [`MemorySink`] | Keyed tree kept in memory; inspectable in tests |
//! | [`ConsoleSink`] | `MemorySink` plus human-readable output to any `Write` |
//!
//! ## Page regions
//!
//! The well-known top-level keys live in [`keys`]. Section nodes are keyed with
//! [`keys::section`].

pub mod console;
pub mod memory;

pub use console::ConsoleSink;
pub use memory::MemorySink;

use crate::render::{DisplayModel, TraceView};

/// Well-known node keys.
pub mod keys {
    /// Info / error banner
    pub const NOTICE: &str = "info-alert";
    /// Busy indicator for the whole upload
    pub const PROGRESS: &str = "progress";
    /// Progressive "thinking" view
    pub const THINKING: &str = "thinking-content";
    /// Container for per-section nodes, child of [`THINKING`]
    pub const SECTIONS: &str = "thinking-sections";
    /// Final report
    pub const RESULTS: &str = "results";
    /// Export action
    pub const EXPORT: &str = "export-action";
    /// "Show thinking traces" action
    pub const SHOW_THINKING: &str = "show-thinking-action";

    /// Key of the node tracking one analysis section.
    pub fn section(name: &str) -> String {
        format!("section:{name}")
    }
}

/// Banner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Danger => "danger",
        }
    }
}

/// User-triggerable follow-up actions offered after a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Export,
    ShowThinking,
}

/// Node content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Cleared / hidden
    Empty,
    /// Upload in flight
    Busy,
    Notice {
        level: NoticeLevel,
        message: String,
    },
    /// One-line status inside the thinking view
    StatusLine(String),
    /// Header of the progressive view once analysis starts
    ThinkingHeader,
    /// Plain container; content lives in its children
    Container,
    /// Section started, result not in yet
    PendingSection {
        section: String,
        message: String,
    },
    /// Section finished
    CompletedSection(TraceView),
    Report(DisplayModel),
    Action(Action),
}

impl Content {
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        Content::Notice {
            level,
            message: message.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Content::PendingSection { .. })
    }
}

/// Rendering target driven by the stream session.
///
/// Semantics follow a DOM subtree:
/// - `replace` swaps a node's content and drops all of its descendants; an unknown key
///   becomes a new top-level node.
/// - `append_child` adds a node under an existing parent and reports `false` if the
///   parent does not exist.
pub trait RenderSink {
    fn replace(&mut self, key: &str, content: Content);

    fn append_child(&mut self, parent: &str, key: &str, content: Content) -> bool;

    fn contains(&self, key: &str) -> bool;
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn replace(&mut self, key: &str, content: Content) {
        (**self).replace(key, content)
    }

    fn append_child(&mut self, parent: &str, key: &str, content: Content) -> bool {
        (**self).append_child(parent, key, content)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

/// Sink that keeps nothing. `contains` is always false, so orphan checks always no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl RenderSink for NoopSink {
    fn replace(&mut self, _key: &str, _content: Content) {}

    fn append_child(&mut self, _parent: &str, _key: &str, _content: Content) -> bool {
        false
    }

    fn contains(&self, _key: &str) -> bool {
        false
    }
}
