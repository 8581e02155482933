//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use property_risk_stream::{AnalyzerClient, AnalyzerConfig};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Test fixture that manages a mock analysis service
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server; environment overrides are not consulted.
    pub fn create_test_client(&self) -> property_risk_stream::Result<AnalyzerClient> {
        AnalyzerClient::builder()
            .config(AnalyzerConfig::default())
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(10))
            .build()
    }

    /// Streaming endpoint answering with the given frames, one per line.
    pub async fn mock_event_stream(&self, frames: &[serde_json::Value]) -> Mock {
        let body: String = frames.iter().map(|f| format!("data: {f}\n")).collect();
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/stream-analysis")
            .match_header("x-request-id", Matcher::Any)
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    /// Streaming endpoint that writes each part separately with a pause in between.
    pub async fn mock_slow_stream(&self, parts: Vec<String>, pause: Duration) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/stream-analysis")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_chunked_body(move |w: &mut dyn Write| {
                for part in &parts {
                    w.write_all(part.as_bytes())?;
                    w.flush()?;
                    std::thread::sleep(pause);
                }
                Ok(())
            })
            .create_async()
            .await
    }

    pub async fn mock_status(&self, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// A mock that must never be hit.
    pub async fn mock_unreachable(&self, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    }

    /// Export endpoint that only answers when the posted body equals `record` exactly.
    pub async fn mock_export(&self, record: serde_json::Value, bytes: &'static [u8]) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/export")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(record))
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(bytes)
            .create_async()
            .await
    }
}
