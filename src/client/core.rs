use crate::client::export::ExportArtifact;
use crate::client::types::CancelHandle;
use crate::client::upload::UploadFile;
use crate::config::AnalyzerConfig;
use crate::pipeline::{Decoder, EventParser, SseEventDecoder};
use crate::session::{SessionOutcome, StreamSession};
use crate::sink::{keys, Content, NoticeLevel, RenderSink};
use crate::transport::HttpTransport;
use crate::types::{AnalysisResult, StreamEvent};
use crate::{BoxStream, Error, ErrorContext, Result};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Client for the property risk analysis service.
pub struct AnalyzerClient {
    pub(crate) config: AnalyzerConfig,
    pub(crate) transport: Arc<HttpTransport>,
}

impl AnalyzerClient {
    /// Client with default settings plus `RISK_ANALYZER_*` overrides.
    pub fn new() -> Result<Self> {
        crate::client::builder::AnalyzerClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::AnalyzerClientBuilder {
        crate::client::builder::AnalyzerClientBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// A fresh session using this client's frame prefix.
    pub fn new_session(&self) -> StreamSession {
        StreamSession::with_parser(EventParser::new(self.config.data_prefix.clone()))
    }

    /// Check an upload without touching the network; the rejection is shown on `sink`.
    pub fn check_upload<S: RenderSink + ?Sized>(&self, upload: &UploadFile, sink: &mut S) -> Result<()> {
        upload.validate(self.config.max_upload_bytes).map_err(|e| {
            sink.replace(
                keys::NOTICE,
                Content::notice(NoticeLevel::Danger, e.user_message()),
            );
            e
        })
    }

    /// Upload a document and render the streamed analysis progressively.
    ///
    /// Returns `Err` only when the upload is rejected before any request is made.
    /// Server-reported and transport failures end the session and come back as
    /// [`SessionOutcome::Failed`]. Cancelling `cancel` stops reading immediately and
    /// yields [`SessionOutcome::Cancelled`] without touching the sink again.
    pub async fn analyze<S: RenderSink + ?Sized>(
        &self,
        upload: &UploadFile,
        sink: &mut S,
        cancel: &CancelHandle,
    ) -> Result<SessionOutcome> {
        self.check_upload(upload, sink)?;

        let mut session = self.new_session();
        let request_id = session.id().to_string();
        session.begin(&upload.filename, sink);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(session_id = %request_id, "analysis cancelled before response");
                return Ok(SessionOutcome::Cancelled);
            }
            r = self.transport.post_multipart_stream(&self.config.stream_path, upload, &request_id) => r,
        };

        let mut body = match response {
            Ok(body) => body,
            Err(e) => {
                session.fail_transport(&e.user_message(), sink);
                return finish(session);
            }
        };

        let mut bytes_read: usize = 0;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(
                        session_id = %request_id,
                        bytes = bytes_read,
                        events = session.events_dispatched(),
                        "analysis cancelled"
                    );
                    return Ok(SessionOutcome::Cancelled);
                }
                chunk = body.next() => chunk,
            };

            match next {
                Some(Ok(chunk)) => {
                    bytes_read += chunk.len();
                    session.feed(&chunk, sink);
                    if session.is_terminal() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    session.fail_transport(&e.user_message(), sink);
                    break;
                }
                None => {
                    session.end_of_stream(sink);
                    break;
                }
            }
        }

        info!(
            session_id = %request_id,
            bytes = bytes_read,
            events = session.events_dispatched(),
            state = session.state().name(),
            "analysis stream closed"
        );
        finish(session)
    }

    /// Raw event stream for callers that drive their own state.
    pub async fn stream_events(&self, upload: &UploadFile) -> Result<BoxStream<'static, StreamEvent>> {
        upload.validate(self.config.max_upload_bytes)?;
        let request_id = Uuid::new_v4().to_string();
        let body = self
            .transport
            .post_multipart_stream(&self.config.stream_path, upload, &request_id)
            .await?;
        let decoder = SseEventDecoder::with_prefix(self.config.data_prefix.clone())?;
        decoder.decode_stream(body).await
    }

    /// Non-streaming analysis: one request, one result document.
    pub async fn analyze_once(&self, upload: &UploadFile) -> Result<AnalysisResult> {
        upload.validate(self.config.max_upload_bytes)?;
        let request_id = Uuid::new_v4().to_string();
        let result: AnalysisResult = self
            .transport
            .post_multipart_json(&self.config.upload_path, upload, &request_id)
            .await?;
        if let Some(message) = result.failure() {
            return Err(Error::runtime_with_context(
                message,
                ErrorContext::new()
                    .with_details(format!("request_id: {request_id}"))
                    .with_source("analyze_once"),
            ));
        }
        Ok(result)
    }

    /// Ask the service to build a downloadable report for `result`.
    ///
    /// The body is the document the service sent, not the normalized typed view.
    pub async fn export(&self, result: &AnalysisResult) -> Result<ExportArtifact> {
        let request_id = Uuid::new_v4().to_string();
        let payload = result.export_payload();
        let (bytes, content_type) = self
            .transport
            .post_json_bytes(&self.config.export_path, &payload, &request_id)
            .await?;
        info!(
            request_id = request_id.as_str(),
            bytes = bytes.len(),
            "report exported"
        );
        Ok(ExportArtifact::new(bytes, content_type))
    }
}

fn finish(session: StreamSession) -> Result<SessionOutcome> {
    session.into_outcome().ok_or_else(|| {
        warn!("stream loop exited without a terminal state");
        Error::runtime("analysis session ended without a terminal state")
    })
}
