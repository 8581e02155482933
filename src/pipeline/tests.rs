use crate::pipeline::{validate_prefix, Decoder, FrameReader, PipelineError, SseEventDecoder};
use crate::types::StreamEvent;
use bytes::Bytes;
use futures::StreamExt;

const BODY: &str = concat!(
    "data: {\"type\":\"status\",\"message\":\"Starting analysis...\"}\n\n",
    ": keep-alive\n",
    "data: {\"type\":\"thinking_start\",\"message\":\"Beginning AI analysis...\"}\n\n",
    "data: {\"type\":\"thinking_section\",\"section\":\"Toit – Dachgeschoss\",\"message\":\"Analyse läuft…\"}\r\n\r\n",
    "data: {not json}\n\n",
    "data: {\"type\":\"thinking_result\",\"section\":\"Toit – Dachgeschoss\",\"trace\":{\"issues_found\":[\"Fuite près de la cheminée 🏠\"]}}\n\n",
    "data: {\"type\":\"complete\",\"data\":{\"risk_factors\":[],\"filename\":\"r.pdf\"}}\n\n",
);

fn events_for_chunks(chunks: &[&[u8]]) -> Vec<StreamEvent> {
    let mut reader = FrameReader::new();
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(reader.feed(chunk));
    }
    out.extend(reader.finish());
    out
}

#[test]
fn whole_body_in_one_chunk() {
    let events = events_for_chunks(&[BODY.as_bytes()]);
    let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "status",
            "thinking_start",
            "thinking_section",
            "thinking_result",
            "complete"
        ]
    );
}

#[test]
fn split_invariance_at_every_single_boundary() {
    let bytes = BODY.as_bytes();
    let expected = events_for_chunks(&[bytes]);
    for cut in 0..=bytes.len() {
        let (a, b) = bytes.split_at(cut);
        assert_eq!(
            events_for_chunks(&[a, b]),
            expected,
            "split at byte {cut} changed the event sequence"
        );
    }
}

#[test]
fn split_invariance_byte_by_byte() {
    let bytes = BODY.as_bytes();
    let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
    assert_eq!(events_for_chunks(&chunks), events_for_chunks(&[bytes]));
}

#[test]
fn split_invariance_with_uneven_strides() {
    let bytes = BODY.as_bytes();
    let expected = events_for_chunks(&[bytes]);
    for stride in [2usize, 3, 5, 7, 13, 64] {
        let chunks: Vec<&[u8]> = bytes.chunks(stride).collect();
        assert_eq!(events_for_chunks(&chunks), expected, "stride {stride}");
    }
}

#[test]
fn multibyte_text_survives_splitting() {
    let bytes = BODY.as_bytes();
    let chunks: Vec<&[u8]> = bytes.chunks(3).collect();
    let events = events_for_chunks(&chunks);
    match &events[3] {
        StreamEvent::ThinkingResult { section, trace } => {
            assert_eq!(section, "Toit – Dachgeschoss");
            assert_eq!(trace.issues_found, vec!["Fuite près de la cheminée 🏠"]);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn malformed_frames_are_counted_and_skipped() {
    let mut reader = FrameReader::new();
    let events = reader.feed(BODY.as_bytes());
    assert_eq!(events.len(), 5);
    assert_eq!(reader.malformed_frames(), 1);
}

#[test]
fn unterminated_tail_is_discarded() {
    let mut reader = FrameReader::new();
    assert!(reader
        .feed(b"data: {\"type\":\"status\",\"message\":\"never terminated\"}")
        .is_empty());
    assert!(reader.finish().is_empty());
}

#[test]
fn prefix_validation() {
    assert!(validate_prefix("data: ").is_ok());
    let err = validate_prefix("data:\n").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidPrefix { hint: Some(_), .. }));
    assert!(err.to_string().contains("Hint"));
    assert!(SseEventDecoder::with_prefix("x\r").is_err());

    let err = validate_prefix("").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidPrefix { hint: Some(_), .. }));
    assert!(err.to_string().contains("blank separator lines"));
    assert!(SseEventDecoder::with_prefix("").is_err());
}

#[tokio::test]
async fn sse_decoder_over_byte_stream() {
    let chunks: Vec<Bytes> = BODY
        .as_bytes()
        .chunks(11)
        .map(Bytes::copy_from_slice)
        .collect();
    let input = futures::stream::iter(chunks).map(Ok::<Bytes, crate::Error>);

    let decoder = SseEventDecoder::new();
    let events: Vec<_> = decoder
        .decode_stream(Box::pin(input))
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(events, events_for_chunks(&[BODY.as_bytes()]));
}

#[tokio::test]
async fn sse_decoder_surfaces_transport_error_and_stops() {
    let items: Vec<crate::Result<Bytes>> = vec![
        Ok(Bytes::from_static(
            b"data: {\"type\":\"status\",\"message\":\"a\"}\n",
        )),
        Err(crate::Error::runtime("connection reset")),
        Ok(Bytes::from_static(
            b"data: {\"type\":\"status\",\"message\":\"b\"}\n",
        )),
    ];
    let decoder = SseEventDecoder::new();
    let results: Vec<_> = decoder
        .decode_stream(Box::pin(futures::stream::iter(items)))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0],
        Ok(StreamEvent::Status { ref message }) if message == "a"
    ));
    assert!(results[1].is_err());
}
