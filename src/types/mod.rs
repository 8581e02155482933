//! 类型系统模块：定义流式分析协议的事件与结果数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of everything the analysis service sends:
//! the incremental stream events and the final analysis record.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StreamEvent`] | One decoded `data:` frame (status, thinking, complete, error) |
//! | [`AnalysisResult`] | Final record delivered by `complete` and posted to export |
//! | [`RiskFactor`] | One finding, index-addressable inside the result |
//! | [`ThinkingTrace`] | Per-section reasoning trace |
//! | [`Severity`] / [`RiskCategory`] | Classifications used for styling |
//!
//! ## Example
//!
//! ```rust
//! use property_risk_stream::types::{StreamEvent, Severity};
//!
//! let ev: StreamEvent = serde_json::from_str(r#"{"type":"status","message":"go"}"#).unwrap();
//! assert_eq!(ev, StreamEvent::Status { message: "go".into() });
//! assert_eq!(Severity::from_label("critical"), Severity::Critical);
//! ```

pub mod analysis;
pub mod events;
mod lenient;

pub use analysis::{AnalysisResult, RiskCategory, RiskFactor, Severity, ThinkingTrace};
pub use events::StreamEvent;
