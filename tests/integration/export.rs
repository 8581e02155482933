//! Export through the application context

use crate::mock_server::MockServerFixture;
use chrono::Utc;
use property_risk_stream::client::export_filename;
use property_risk_stream::sink::{keys, Content, MemorySink, NoticeLevel, NoopSink};
use property_risk_stream::{AnalyzerContext, CancelHandle, Error, SessionOutcome, UploadFile};
use serde_json::{json, Value};

fn inspection_record() -> Value {
    json!({
        "overall_risk_score": "High",
        "risk_factors": [
            {"category": "Safety Hazards", "severity": "High", "description": "Missing railing",
             "recommendation": "Install railing", "cost_impact": "$800"}
        ],
        "filename": "inspection.txt",
        "thinking_traces": [{"section": "Safety", "issues_found": ["Railing"], "reasoning": "Stairs"}]
    })
}

async fn completed_context(fixture: &MockServerFixture, record: Value) -> AnalyzerContext {
    let _stream = fixture
        .mock_event_stream(&[json!({"type": "complete", "data": record})])
        .await;

    let mut context = AnalyzerContext::new(fixture.create_test_client().unwrap());
    let outcome = context
        .upload(
            &UploadFile::new("inspection.txt", b"stairs".to_vec()),
            &mut NoopSink,
            &CancelHandle::new(),
        )
        .await
        .unwrap();
    assert!(outcome.is_completed());
    context
}

#[tokio::test]
async fn export_saves_report_bytes() {
    let fixture = MockServerFixture::new().await;
    let mut context = completed_context(&fixture, inspection_record()).await;
    let mock = fixture
        .mock_export(inspection_record(), b"Category,Severity\nSafety Hazards,High\n")
        .await;

    let dir = std::env::temp_dir().join(format!("risk-export-it-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let mut sink = MemorySink::new();
    let path = context.export_to(&dir, &mut sink).await.unwrap();
    mock.assert_async().await;

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        export_filename(Utc::now().date_naive())
    );
    assert_eq!(
        tokio::fs::read(&path).await.unwrap(),
        b"Category,Severity\nSafety Hazards,High\n"
    );
    tokio::fs::remove_dir_all(&dir).await.unwrap();

    // a rejected or cancelled upload keeps the previous result available
    let err = context
        .upload(
            &UploadFile::new("photo.png", b"x".to_vec()),
            &mut sink,
            &CancelHandle::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let cancel = CancelHandle::new();
    cancel.cancel();
    let outcome = context
        .upload(&UploadFile::new("second.txt", b"x".to_vec()), &mut sink, &cancel)
        .await
        .unwrap();
    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(
        context.last_result().and_then(|r| r.filename.as_deref()),
        Some("inspection.txt")
    );
}

#[tokio::test]
async fn export_posts_the_record_as_received() {
    let fixture = MockServerFixture::new().await;
    let record = json!({
        "overall_risk_score": 7,
        "risk_factors": [
            {"category": "Roofing Issues", "severity": "Moderate", "description": "Worn shingles"},
            {"category": "Property Condition", "description": "Peeling paint"}
        ],
        "filename": "inspection.txt",
        "upload_time": "15/12/2024",
        "text_length": 5120
    });
    let context = completed_context(&fixture, record.clone()).await;
    let mock = fixture.mock_export(record, b"ok").await;

    let artifact = context.export(&mut NoopSink).await.unwrap();
    mock.assert_async().await;
    assert_eq!(&artifact.bytes[..], b"ok");
}

#[tokio::test]
async fn detail_and_thinking_come_from_last_result() {
    let fixture = MockServerFixture::new().await;
    let context = completed_context(&fixture, inspection_record()).await;

    let detail = context.risk_detail(0).unwrap();
    assert_eq!(detail.category, "Safety Hazards");
    assert_eq!(detail.recommendation.as_deref(), Some("Install railing"));
    assert!(context.risk_detail(1).is_none());

    let traces = context.thinking_report();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].title, "Safety");
    assert_eq!(traces[0].reasoning.as_deref(), Some("Stairs"));
}

#[tokio::test]
async fn export_failure_is_shown() {
    let fixture = MockServerFixture::new().await;
    let context = completed_context(&fixture, inspection_record()).await;
    let _mock = fixture.mock_status("/export", 500, "{}").await;

    let mut sink = MemorySink::new();
    let err = context.export(&mut sink).await.unwrap_err();
    assert!(matches!(err, Error::Remote { status: 500, .. }));
    assert_eq!(
        sink.get(keys::NOTICE),
        Some(&Content::notice(
            NoticeLevel::Danger,
            "Error exporting report: HTTP error! status: 500"
        ))
    );
}

#[tokio::test]
async fn export_without_result_is_rejected() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable("/export").await;
    let context = AnalyzerContext::new(fixture.create_test_client().unwrap());

    let err = context.export(&mut NoopSink).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    mock.assert_async().await;
}
