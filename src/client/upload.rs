//! Upload payload and the client-side checks that run before any request.

use crate::{Error, ErrorContext, Result};
use std::path::Path;

pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "text/plain"];
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".txt"];
pub const INVALID_TYPE_MESSAGE: &str = "Please select a PDF or text file.";

const MIB: u64 = 1024 * 1024;

/// A document to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    /// Declared MIME type; guessed from the extension when absent
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, content))
    }

    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn mime(&self) -> &str {
        if let Some(ct) = self.content_type.as_deref() {
            return ct;
        }
        if self.filename.ends_with(".pdf") {
            "application/pdf"
        } else if self.filename.ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        }
    }

    /// Either the declared type or the extension must be accepted; then the size limit.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        let type_ok = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ALLOWED_MIME_TYPES.contains(&ct));
        let extension_ok = ALLOWED_EXTENSIONS
            .iter()
            .any(|ext| self.filename.ends_with(ext));
        if !type_ok && !extension_ok {
            return Err(Error::validation_with_context(
                INVALID_TYPE_MESSAGE,
                ErrorContext::new()
                    .with_field_path("upload.type")
                    .with_details(self.filename.clone())
                    .with_source("upload_validator"),
            ));
        }

        if self.len() > max_bytes {
            return Err(Error::validation_with_context(
                size_message(max_bytes),
                ErrorContext::new()
                    .with_field_path("upload.size")
                    .with_details(format!("{} bytes", self.len()))
                    .with_source("upload_validator"),
            ));
        }
        Ok(())
    }
}

fn size_message(max_bytes: u64) -> String {
    if max_bytes % MIB == 0 {
        format!("File size must be less than {}MB.", max_bytes / MIB)
    } else {
        format!("File size must be less than {max_bytes} bytes.")
    }
}
