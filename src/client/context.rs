use crate::client::core::AnalyzerClient;
use crate::client::export::ExportArtifact;
use crate::client::types::CancelHandle;
use crate::client::upload::UploadFile;
use crate::render::{risk_detail, thinking_report, RiskDetail, TraceView};
use crate::session::SessionOutcome;
use crate::sink::{keys, Content, NoticeLevel, RenderSink};
use crate::types::AnalysisResult;
use crate::{Error, ErrorContext, Result};
use std::path::{Path, PathBuf};

pub const NOTHING_TO_EXPORT: &str = "No analysis result to export";

/// Application state around the client: owns the last completed result.
///
/// Detail lookups, the thinking report and export all read from here. A failed or
/// cancelled upload leaves the previous result in place.
pub struct AnalyzerContext {
    client: AnalyzerClient,
    last_result: Option<AnalysisResult>,
}

impl AnalyzerContext {
    pub fn new(client: AnalyzerClient) -> Self {
        Self {
            client,
            last_result: None,
        }
    }

    pub fn client(&self) -> &AnalyzerClient {
        &self.client
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    pub async fn upload<S: RenderSink + ?Sized>(
        &mut self,
        upload: &UploadFile,
        sink: &mut S,
        cancel: &CancelHandle,
    ) -> Result<SessionOutcome> {
        let outcome = self.client.analyze(upload, sink, cancel).await?;
        if let SessionOutcome::Completed(result) = &outcome {
            self.last_result = Some(result.clone());
        }
        Ok(outcome)
    }

    pub async fn upload_path<S: RenderSink + ?Sized>(
        &mut self,
        path: impl AsRef<Path>,
        sink: &mut S,
        cancel: &CancelHandle,
    ) -> Result<SessionOutcome> {
        let upload = UploadFile::from_path(path).await?;
        self.upload(&upload, sink, cancel).await
    }

    pub fn risk_detail(&self, index: usize) -> Option<RiskDetail> {
        self.last_result
            .as_ref()
            .and_then(|result| risk_detail(result, index))
    }

    pub fn thinking_report(&self) -> Vec<TraceView> {
        self.last_result
            .as_ref()
            .map(thinking_report)
            .unwrap_or_default()
    }

    /// Fetch the export for the last result. Failures are shown on `sink`.
    pub async fn export<S: RenderSink + ?Sized>(&self, sink: &mut S) -> Result<ExportArtifact> {
        let Some(result) = &self.last_result else {
            return Err(Error::validation_with_context(
                NOTHING_TO_EXPORT,
                ErrorContext::new().with_source("export"),
            ));
        };
        self.client
            .export(result)
            .await
            .map_err(|e| show_export_error(e, sink))
    }

    /// Export and write the artifact into `dir`.
    pub async fn export_to<S: RenderSink + ?Sized>(
        &self,
        dir: impl AsRef<Path>,
        sink: &mut S,
    ) -> Result<PathBuf> {
        let artifact = self.export(sink).await?;
        artifact
            .save_in(dir)
            .await
            .map_err(|e| show_export_error(e, sink))
    }
}

fn show_export_error<S: RenderSink + ?Sized>(error: Error, sink: &mut S) -> Error {
    sink.replace(
        keys::NOTICE,
        Content::notice(
            NoticeLevel::Danger,
            format!("Error exporting report: {}", error.user_message()),
        ),
    );
    error
}
