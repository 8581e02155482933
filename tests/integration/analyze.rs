//! End-to-end uploads against the mock analysis service

use crate::mock_server::MockServerFixture;
use futures::StreamExt;
use property_risk_stream::sink::{keys, Content, MemorySink, NoticeLevel, RenderSink};
use property_risk_stream::{
    AnalyzerClient, AnalyzerConfig, CancelHandle, Error, SessionOutcome, StreamEvent, UploadFile,
};
use serde_json::json;
use std::time::Duration;

fn text_upload() -> UploadFile {
    UploadFile::new("inspection.txt", b"Roof shows missing shingles.".to_vec())
}

fn danger_notice(sink: &MemorySink) -> String {
    match sink.get(keys::NOTICE) {
        Some(Content::Notice {
            level: NoticeLevel::Danger,
            message,
        }) => message.clone(),
        other => panic!("expected a danger notice, got {other:?}"),
    }
}

#[tokio::test]
async fn streamed_analysis_completes() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_event_stream(&[
            json!({"type": "status", "message": "Reading text file..."}),
            json!({"type": "thinking_start", "message": "Starting AI analysis..."}),
            json!({"type": "thinking_section", "section": "Roofing", "message": "Analyzing Roofing..."}),
            json!({"type": "thinking_result", "section": "Roofing",
                   "trace": {"issues_found": ["Missing shingles"], "reasoning": "Visible gaps"}}),
            json!({"type": "complete", "data": {
                "overall_risk_score": "Medium",
                "summary": "Roof needs repair.",
                "risk_factors": [{"category": "Roofing Issues", "severity": "Medium",
                                  "description": "Missing shingles", "location": "North slope",
                                  "recommendation": "Replace shingles"}],
                "filename": "inspection.txt",
                "upload_time": "2024-12-15T10:30:00.123456",
                "thinking_traces": [{"section": "Roofing", "issues_found": ["Missing shingles"]}]
            }}),
        ])
        .await;

    let client = fixture.create_test_client().unwrap();
    let mut sink = MemorySink::new();
    let outcome = client
        .analyze(&text_upload(), &mut sink, &CancelHandle::new())
        .await
        .unwrap();
    mock.assert_async().await;

    let result = match outcome {
        SessionOutcome::Completed(result) => result,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(result.risk_factors.len(), 1);
    assert_eq!(result.filename.as_deref(), Some("inspection.txt"));

    match sink.get(keys::RESULTS) {
        Some(Content::Report(model)) => {
            assert_eq!(model.score.value, "Medium");
            assert_eq!(model.cards[0].style.class, "roofing");
            assert!(model.has_thinking_traces);
        }
        other => panic!("expected a report, got {other:?}"),
    }
    assert!(!sink.contains(&keys::section("Roofing")));
}

#[tokio::test]
async fn server_error_event_fails_the_session() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_event_stream(&[
            json!({"type": "thinking_start"}),
            json!({"type": "error", "message": "OpenAI API key not configured"}),
            json!({"type": "status", "message": "never rendered"}),
        ])
        .await;

    let client = fixture.create_test_client().unwrap();
    let mut sink = MemorySink::new();
    let outcome = client
        .analyze(&text_upload(), &mut sink, &CancelHandle::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            message: "OpenAI API key not configured".into()
        }
    );
    assert_eq!(danger_notice(&sink), "Error: OpenAI API key not configured");
}

#[tokio::test]
async fn non_success_status_is_a_transport_failure() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_status("/stream-analysis", 500, r#"{"error":"internal"}"#)
        .await;

    let client = fixture.create_test_client().unwrap();
    let mut sink = MemorySink::new();
    let outcome = client
        .analyze(&text_upload(), &mut sink, &CancelHandle::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            message: "HTTP error! status: 500".into()
        }
    );
    assert_eq!(
        danger_notice(&sink),
        "Error uploading file: HTTP error! status: 500"
    );
    assert_eq!(sink.get(keys::PROGRESS), Some(&Content::Empty));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    // Port 9 (discard) is not expected to be listening on loopback.
    let client = AnalyzerClient::builder()
        .config(AnalyzerConfig::default())
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();
    let mut sink = MemorySink::new();
    let outcome = client
        .analyze(&text_upload(), &mut sink, &CancelHandle::new())
        .await
        .unwrap();

    assert!(matches!(outcome, SessionOutcome::Failed { .. }));
    assert!(danger_notice(&sink).starts_with("Error uploading file: "));
}

#[tokio::test]
async fn stream_without_terminal_event_fails() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_event_stream(&[json!({"type": "status", "message": "Reading PDF file..."})])
        .await;

    let client = fixture.create_test_client().unwrap();
    let mut sink = MemorySink::new();
    let outcome = client
        .analyze(&text_upload(), &mut sink, &CancelHandle::new())
        .await
        .unwrap();
    assert!(matches!(outcome, SessionOutcome::Failed { .. }));
}

#[tokio::test]
async fn invalid_upload_never_reaches_the_network() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable("/stream-analysis").await;
    let client = fixture.create_test_client().unwrap();
    let mut sink = MemorySink::new();

    let err = client
        .analyze(
            &UploadFile::new("photo.jpg", vec![0xFF, 0xD8]),
            &mut sink,
            &CancelHandle::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(danger_notice(&sink), "Please select a PDF or text file.");
    assert!(!sink.contains(keys::PROGRESS));

    let too_big = UploadFile::new("big.pdf", vec![0u8; 10 * 1024 * 1024 + 1]);
    let err = client
        .analyze(&too_big, &mut sink, &CancelHandle::new())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "File size must be less than 10MB.");

    mock.assert_async().await;
}

#[tokio::test]
async fn cancelled_before_start_renders_nothing_terminal() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_event_stream(&[json!({"type": "complete", "data": {"risk_factors": []}})])
        .await;

    let client = fixture.create_test_client().unwrap();
    let cancel = CancelHandle::new();
    cancel.cancel();
    let mut sink = MemorySink::new();
    let outcome = client.analyze(&text_upload(), &mut sink, &cancel).await.unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(sink.get(keys::PROGRESS), Some(&Content::Busy));
    assert!(!sink.contains(keys::RESULTS));
}

/// Cancels its handle as soon as the first server status is rendered.
struct CancelOnStatus {
    inner: MemorySink,
    cancel: CancelHandle,
}

impl RenderSink for CancelOnStatus {
    fn replace(&mut self, key: &str, content: Content) {
        if matches!(content, Content::StatusLine(_)) {
            self.cancel.cancel();
        }
        self.inner.replace(key, content);
    }

    fn append_child(&mut self, parent: &str, key: &str, content: Content) -> bool {
        self.inner.append_child(parent, key, content)
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

#[tokio::test]
async fn cancel_mid_stream_stops_without_terminal_state() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_slow_stream(
            vec![
                format!("data: {}\n", json!({"type": "status", "message": "Reading text file..."})),
                format!("data: {}\n", json!({"type": "complete", "data": {"risk_factors": []}})),
            ],
            Duration::from_millis(300),
        )
        .await;

    let client = fixture.create_test_client().unwrap();
    let cancel = CancelHandle::new();
    let mut sink = CancelOnStatus {
        inner: MemorySink::new(),
        cancel: cancel.clone(),
    };
    let outcome = client.analyze(&text_upload(), &mut sink, &cancel).await.unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert!(!sink.inner.contains(keys::RESULTS));
    assert_eq!(
        sink.inner.get(keys::NOTICE),
        Some(&Content::notice(NoticeLevel::Info, "Reading text file..."))
    );
}

#[tokio::test]
async fn raw_event_stream() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_event_stream(&[
            json!({"type": "status", "message": "Reading text file..."}),
            json!({"type": "complete", "data": {"risk_factors": []}}),
        ])
        .await;

    let client = fixture.create_test_client().unwrap();
    let events: Vec<StreamEvent> = client
        .stream_events(&text_upload())
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;
    assert_eq!(events.len(), 2);
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn one_shot_upload_returns_result() {
    let fixture = MockServerFixture::new().await;
    let _ok = fixture
        .mock_status(
            "/upload",
            200,
            r#"{"overall_risk_score":"Low","risk_factors":[],"filename":"inspection.txt","upload_time":"2024-12-15T10:30:00"}"#,
        )
        .await;

    let client = fixture.create_test_client().unwrap();
    let result = client.analyze_once(&text_upload()).await.unwrap();
    assert_eq!(result.overall_risk_score.as_deref(), Some("Low"));
    assert!(result.upload_time.is_some());
}
