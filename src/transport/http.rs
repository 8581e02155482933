use crate::client::upload::UploadFile;
use crate::config::AnalyzerConfig;
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Proxy, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy url: {e}"),
                    ErrorContext::new().with_field_path("proxy_url"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn multipart(upload: &UploadFile) -> Result<Form> {
        let part = Part::bytes(upload.content.clone())
            .file_name(upload.filename.clone())
            .mime_str(upload.mime())
            .map_err(TransportError::Http)?;
        Ok(Form::new().part("file", part))
    }

    /// Send and turn any non-success status into `Error::Remote`.
    async fn send_checked(&self, req: RequestBuilder, path: &str) -> Result<Response> {
        let start = std::time::Instant::now();
        let resp = req.send().await.map_err(TransportError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            info!(
                http_status = status,
                endpoint = path,
                duration_ms = start.elapsed().as_millis(),
                "risk analyzer request failed"
            );
            return Err(Error::Remote {
                status,
                message: body,
            });
        }
        Ok(resp)
    }

    /// Multipart upload whose response body is consumed incrementally.
    pub async fn post_multipart_stream(
        &self,
        path: &str,
        upload: &UploadFile,
        request_id: &str,
    ) -> Result<BoxStream<'static, Bytes>> {
        let req = self
            .client
            .post(self.url(path))
            .header("accept", "text/event-stream")
            .header(REQUEST_ID_HEADER, request_id)
            .multipart(Self::multipart(upload)?);
        let resp = self.send_checked(req, path).await?;

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }

    /// Multipart upload answered with a single JSON document.
    pub async fn post_multipart_json<T: DeserializeOwned>(
        &self,
        path: &str,
        upload: &UploadFile,
        request_id: &str,
    ) -> Result<T> {
        let req = self
            .client
            .post(self.url(path))
            .header(REQUEST_ID_HEADER, request_id)
            .multipart(Self::multipart(upload)?);
        let resp = self.send_checked(req, path).await?;
        let json = resp.json().await.map_err(TransportError::Http)?;
        Ok(json)
    }

    /// JSON POST answered with an opaque body. Returns the bytes and the content type.
    pub async fn post_json_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        request_id: &str,
    ) -> Result<(Bytes, Option<String>)> {
        let req = self
            .client
            .post(self.url(path))
            .header(REQUEST_ID_HEADER, request_id)
            .json(body);
        let resp = self.send_checked(req, path).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await.map_err(TransportError::Http)?;
        Ok((bytes, content_type))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
