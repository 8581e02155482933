//! Client surface for the risk analysis service.
//!
//! Keep the public surface small: one client, one builder, one application context.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod context;
pub mod core;
pub mod export;
pub mod types;
pub mod upload;

pub use builder::AnalyzerClientBuilder;
pub use context::AnalyzerContext;
pub use core::AnalyzerClient;
pub use export::{export_filename, ExportArtifact};
pub use types::{cancel_pair, CancelHandle};
pub use upload::UploadFile;
