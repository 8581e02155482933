//! 会话状态机模块：按到达顺序消费流事件并驱动渐进式渲染。
//!
//! # Stream Session
//!
//! One [`StreamSession`] exists per upload. It owns the decode state for the connection
//! and the set of open analysis sections, and folds every decoded event into a
//! [`RenderSink`] strictly in arrival order.
//!
//! ## States
//!
//! ```text
//! Idle ──begin──▶ Uploading ──thinking_start──▶ Thinking{open_sections}
//!                     │                              │
//!                     └──── complete | error | transport failure ────▶ Terminal
//! ```
//!
//! Exactly one terminal transition happens per session. Events arriving afterwards are
//! ignored, and the driver stops reading the body.

mod state;

pub use state::{SessionOutcome, SessionState, Terminal};

use crate::pipeline::{EventParser, FrameReader};
use crate::render::{render_result, TraceView};
use crate::sink::{keys, Action, Content, NoticeLevel, RenderSink};
use crate::types::{AnalysisResult, StreamEvent, ThinkingTrace};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const STARTING_MESSAGE: &str = "Starting analysis...";
pub const COMPLETED_MESSAGE: &str = "Analysis completed successfully!";
pub const NO_DATA_MESSAGE: &str = "No data received from server";
pub const TRUNCATED_STREAM_MESSAGE: &str = "stream ended before the analysis completed";

/// Per-upload stream state and render state machine.
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    state: SessionState,
    frames: FrameReader,
    result: Option<AnalysisResult>,
    dispatched: usize,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::with_parser(EventParser::default())
    }

    pub fn with_parser(parser: EventParser) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            frames: FrameReader::with_parser(parser),
            result: None,
            dispatched: 0,
        }
    }

    /// Correlation id; sent upstream as `x-request-id`.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn open_sections(&self) -> Option<&BTreeSet<String>> {
        self.state.open_sections()
    }

    /// Events that reached the state machine (excludes anything after the terminal one).
    pub fn events_dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn malformed_frames(&self) -> usize {
        self.frames.malformed_frames()
    }

    /// `Idle → Uploading`: show the busy indicator and an empty progressive view.
    pub fn begin<S: RenderSink + ?Sized>(&mut self, filename: &str, sink: &mut S) {
        if self.state != SessionState::Idle {
            warn!(session_id = %self.id, state = self.state.name(), "begin called twice; ignoring");
            return;
        }
        info!(session_id = %self.id, filename, "analysis upload started");
        sink.replace(keys::PROGRESS, Content::Busy);
        sink.replace(keys::THINKING, Content::Empty);
        sink.replace(keys::NOTICE, Content::notice(NoticeLevel::Info, STARTING_MESSAGE));
        self.state = SessionState::Uploading;
    }

    /// Decode one network chunk and dispatch every event it completed.
    /// Returns how many events were dispatched.
    pub fn feed<S: RenderSink + ?Sized>(&mut self, chunk: &[u8], sink: &mut S) -> usize {
        if self.is_terminal() {
            return 0;
        }
        let before = self.dispatched;
        for event in self.frames.feed(chunk) {
            self.dispatch(event, sink);
        }
        self.dispatched - before
    }

    /// The body ended. Anything still buffered is flushed; a stream that never delivered
    /// a terminal event is treated as a transport failure.
    pub fn end_of_stream<S: RenderSink + ?Sized>(&mut self, sink: &mut S) {
        if self.is_terminal() {
            return;
        }
        for event in self.frames.finish() {
            self.dispatch(event, sink);
        }
        if !self.is_terminal() {
            self.fail_transport(TRUNCATED_STREAM_MESSAGE, sink);
        }
    }

    /// Transport-level failure (connection error, non-success status, truncated body).
    /// Reaches the same terminal state as a server `error` event.
    pub fn fail_transport<S: RenderSink + ?Sized>(&mut self, detail: &str, sink: &mut S) {
        if self.is_terminal() {
            return;
        }
        warn!(session_id = %self.id, detail, "transport failure");
        self.fail(format!("Error uploading file: {detail}"), detail.to_string(), sink);
    }

    /// Apply one event. Processing is strictly sequential; nothing is batched or reordered.
    pub fn dispatch<S: RenderSink + ?Sized>(&mut self, event: StreamEvent, sink: &mut S) {
        if self.is_terminal() {
            debug!(session_id = %self.id, kind = event.kind(), "ignoring event after terminal state");
            return;
        }
        self.dispatched += 1;
        debug!(
            session_id = %self.id,
            kind = event.kind(),
            state = self.state.name(),
            "dispatching stream event"
        );

        match event {
            StreamEvent::Status { message } => self.on_status(message, sink),
            StreamEvent::ThinkingStart { .. } => self.on_thinking_start(sink),
            StreamEvent::ThinkingSection { section, message } => {
                self.on_section(section, message, sink)
            }
            StreamEvent::ThinkingResult { section, trace } => {
                self.on_section_result(&section, &trace, sink)
            }
            StreamEvent::Complete { data } => self.on_complete(data, sink),
            StreamEvent::Error { message } => {
                self.fail(format!("Error: {message}"), message, sink)
            }
        }
    }

    /// Final outcome, once terminal. `None` while the session is still running.
    pub fn into_outcome(self) -> Option<SessionOutcome> {
        match self.state {
            SessionState::Terminal(Terminal::Complete) => {
                Some(SessionOutcome::Completed(self.result.unwrap_or_default()))
            }
            SessionState::Terminal(Terminal::Error { message }) => {
                Some(SessionOutcome::Failed { message })
            }
            _ => None,
        }
    }

    fn on_status<S: RenderSink + ?Sized>(&mut self, message: String, sink: &mut S) {
        // Inside the thinking phase the section list stays; only the banner changes.
        if !matches!(self.state, SessionState::Thinking { .. }) {
            sink.replace(keys::THINKING, Content::StatusLine(message.clone()));
        }
        sink.replace(keys::NOTICE, Content::notice(NoticeLevel::Info, message));
    }

    fn on_thinking_start<S: RenderSink + ?Sized>(&mut self, sink: &mut S) {
        sink.replace(keys::THINKING, Content::ThinkingHeader);
        sink.append_child(keys::THINKING, keys::SECTIONS, Content::Container);
        self.state = SessionState::Thinking {
            open_sections: BTreeSet::new(),
        };
    }

    fn on_section<S: RenderSink + ?Sized>(&mut self, section: String, message: String, sink: &mut S) {
        let SessionState::Thinking { open_sections } = &mut self.state else {
            warn!(session_id = %self.id, section = %section, "thinking_section before thinking_start; ignoring");
            return;
        };
        if open_sections.contains(&section) {
            warn!(session_id = %self.id, section = %section, "duplicate thinking_section; ignoring");
            return;
        }
        sink.append_child(
            keys::SECTIONS,
            &keys::section(&section),
            Content::PendingSection {
                section: section.clone(),
                message,
            },
        );
        open_sections.insert(section);
    }

    fn on_section_result<S: RenderSink + ?Sized>(
        &mut self,
        section: &str,
        trace: &ThinkingTrace,
        sink: &mut S,
    ) {
        // TODO: confirm with the analysis service owners whether a result without a
        // prior thinking_section can legitimately happen; it is tolerated as a no-op.
        let key = keys::section(section);
        if !sink.contains(&key) {
            debug!(session_id = %self.id, section, "thinking_result for unknown section; no-op");
            return;
        }
        sink.replace(
            &key,
            Content::CompletedSection(TraceView::for_section(section, trace)),
        );
    }

    fn on_complete<S: RenderSink + ?Sized>(&mut self, data: Option<AnalysisResult>, sink: &mut S) {
        let Some(data) = data else {
            self.fail(NO_DATA_MESSAGE.to_string(), NO_DATA_MESSAGE.to_string(), sink);
            return;
        };
        if let Some(error) = data.failure() {
            let error = error.to_string();
            self.fail(error.clone(), error, sink);
            return;
        }

        sink.replace(keys::PROGRESS, Content::Empty);
        sink.replace(keys::THINKING, Content::Empty);
        let model = render_result(&data);
        let has_traces = model.has_thinking_traces;
        sink.replace(keys::RESULTS, Content::Report(model));
        sink.replace(keys::EXPORT, Content::Action(Action::Export));
        if has_traces {
            sink.replace(keys::SHOW_THINKING, Content::Action(Action::ShowThinking));
        }
        sink.replace(keys::NOTICE, Content::notice(NoticeLevel::Success, COMPLETED_MESSAGE));

        info!(
            session_id = %self.id,
            risk_factors = data.risk_factors.len(),
            events = self.dispatched,
            malformed = self.frames.malformed_frames(),
            "analysis complete"
        );
        self.result = Some(data);
        self.state = SessionState::Terminal(Terminal::Complete);
    }

    fn fail<S: RenderSink + ?Sized>(&mut self, notice: String, message: String, sink: &mut S) {
        sink.replace(keys::PROGRESS, Content::Empty);
        sink.replace(keys::THINKING, Content::Empty);
        sink.replace(keys::NOTICE, Content::notice(NoticeLevel::Danger, notice));
        info!(session_id = %self.id, reason = %message, "analysis failed");
        self.state = SessionState::Terminal(Terminal::Error { message });
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
