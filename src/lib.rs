//! # property-risk-stream
//!
//! 房产风险分析服务的流式客户端：增量解码事件流、渐进式渲染分析进度、导出报告。
//!
//! Streaming client for the property risk analysis service. A document is uploaded,
//! the service streams its analysis back as newline-delimited `data: <json>` frames,
//! and the client renders progress as it arrives and the final report once complete.
//!
//! ## Overview
//!
//! The response body is decoded incrementally: chunk boundaries may split characters,
//! lines, or JSON payloads anywhere. Decoded events drive a per-upload state machine
//! that writes into a [`RenderSink`]. The sink is a small keyed-tree abstraction, so
//! the same session logic renders to a terminal, an in-memory tree for tests, or
//! nowhere at all.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use property_risk_stream::{AnalyzerClient, CancelHandle, ConsoleSink, SessionOutcome, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> property_risk_stream::Result<()> {
//!     let client = AnalyzerClient::builder()
//!         .base_url("http://127.0.0.1:5001")
//!         .build()?;
//!
//!     let upload = UploadFile::from_path("inspection.pdf").await?;
//!     let mut sink = ConsoleSink::stdout();
//!     match client.analyze(&upload, &mut sink, &CancelHandle::new()).await? {
//!         SessionOutcome::Completed(result) => println!("{} risk factors", result.risk_factors.len()),
//!         SessionOutcome::Failed { message } => eprintln!("failed: {message}"),
//!         SessionOutcome::Cancelled => {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | Chunk decoding, line reassembly, frame parsing |
//! | [`session`] | Per-upload render state machine |
//! | [`sink`] | Rendering sink trait and implementations |
//! | [`render`] | Pure result → display model transforms |
//! | [`types`] | Wire events and the analysis record |
//! | [`client`] | HTTP client, uploads, export, application context |
//! | [`config`] | Configuration file and environment overrides |

pub mod client;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod sink;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{
    cancel_pair, AnalyzerClient, AnalyzerClientBuilder, AnalyzerContext, CancelHandle,
    ExportArtifact, UploadFile,
};
pub use config::AnalyzerConfig;
pub use render::{render_result, risk_detail, thinking_report, DisplayModel};
pub use session::{SessionOutcome, SessionState, StreamSession, Terminal};
pub use sink::{ConsoleSink, Content, MemorySink, NoopSink, RenderSink};
pub use types::{AnalysisResult, RiskFactor, Severity, StreamEvent, ThinkingTrace};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
