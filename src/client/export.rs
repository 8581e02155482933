//! Export artifact returned by the report endpoint.

use crate::Result;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// Downloaded report, ready to be written somewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ExportArtifact {
    /// Name the artifact after today's UTC date.
    pub fn new(bytes: Bytes, content_type: Option<String>) -> Self {
        Self {
            filename: export_filename(Utc::now().date_naive()),
            content_type,
            bytes,
        }
    }

    /// Write into `dir` under the artifact's filename and return the full path.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("risk_analysis_{}.xlsx", date.format("%Y-%m-%d"))
}
