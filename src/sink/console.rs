use super::{Action, Content, MemorySink, RenderSink};
use std::io::Write;

/// Prints every visible mutation as plain text while keeping the keyed structure in a
/// [`MemorySink`], so section lookups behave exactly like the in-memory tree.
pub struct ConsoleSink<W: Write> {
    tree: MemorySink,
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            tree: MemorySink::new(),
            out,
        }
    }

    pub fn tree(&self) -> &MemorySink {
        &self.tree
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, content: &Content) {
        let text = match content {
            Content::Empty | Content::Container => return,
            Content::Busy => "Uploading...".to_string(),
            Content::Notice { level, message } => format!("[{}] {}", level.as_str(), message),
            Content::StatusLine(message) => format!("  · {message}"),
            Content::ThinkingHeader => "== AI Analysis Started ==".to_string(),
            Content::PendingSection { section, message } => {
                format!("  … {section}: {message}")
            }
            Content::CompletedSection(trace) => {
                let body = trace.to_string();
                let mut text = format!("  ✓ {} (analysis complete)", trace.title);
                for line in body.lines().skip(1) {
                    text.push_str("\n    ");
                    text.push_str(line);
                }
                text
            }
            Content::Report(model) => model.to_string(),
            Content::Action(Action::Export) => "Export available".into(),
            Content::Action(Action::ShowThinking) => "Thinking traces available".into(),
        };
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "console sink write failed");
        }
    }
}

impl<W: Write> RenderSink for ConsoleSink<W> {
    fn replace(&mut self, key: &str, content: Content) {
        self.emit(&content);
        self.tree.replace(key, content);
    }

    fn append_child(&mut self, parent: &str, key: &str, content: Content) -> bool {
        if !self.tree.contains(parent) || self.tree.contains(key) {
            return false;
        }
        self.emit(&content);
        self.tree.append_child(parent, key, content)
    }

    fn contains(&self, key: &str) -> bool {
        self.tree.contains(key)
    }
}
