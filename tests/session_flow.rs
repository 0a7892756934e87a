//! End-to-end session tests over a real loopback WebSocket connection.

use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use subwire::audio::{MockChunkSource, MockSourceOpener};
use subwire::metrics::RecordingMetricSink;
use subwire::server::Server;
use subwire::session::protocol::{ServerMessage, SessionEvent};
use subwire::session::SessionServices;
use subwire::storage::CatalogAssetStore;
use subwire::transcribe::event::{TimedItem, TranscriptEvent};
use subwire::transcribe::MockTranscribeBackend;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const ASSET: &str = "123765";

fn request_json(subtitle_format: Option<&str>) -> String {
    match subtitle_format {
        Some(format) => format!(
            r#"{{"uuid": "{}", "source_locale": "en-US", "target_locale": "en-IN",
                "request_type": "transcription", "subtitle_format": "{}"}}"#,
            ASSET, format
        ),
        None => format!(
            r#"{{"uuid": "{}", "source_locale": "en-US", "target_locale": "en-IN",
                "request_type": "transcription"}}"#,
            ASSET
        ),
    }
}

async fn start_server(
    source: MockChunkSource,
    backend: MockTranscribeBackend,
) -> (WsClient, Arc<RecordingMetricSink>) {
    let mut catalog = HashMap::new();
    catalog.insert(ASSET.to_string(), PathBuf::from("/media/videoplayback.mp4"));
    let metrics = Arc::new(RecordingMetricSink::new());

    let services = Arc::new(SessionServices {
        assets: Arc::new(CatalogAssetStore::new(catalog)),
        opener: Arc::new(MockSourceOpener::new(Box::new(source))),
        transcribe: Arc::new(backend),
        metrics: Arc::clone(&metrics) as Arc<dyn subwire::metrics::MetricSink>,
        fallback_language: "en-US".to_string(),
    });

    let server = Server::bind("127.0.0.1:0", services).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let (ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
    (ws, metrics)
}

async fn next_message(ws: &mut WsClient) -> Option<ServerMessage> {
    loop {
        match ws.next().await? {
            Ok(Message::Text(text)) => return Some(ServerMessage::from_json(&text).unwrap()),
            Ok(Message::Close(_)) => return None,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

#[tokio::test]
async fn full_session_streams_webvtt_cues_in_order() {
    let source = MockChunkSource::new().with_chunks(vec![vec![0u8; 32000]; 3]);
    let backend = MockTranscribeBackend::new().with_events(vec![
        TranscriptEvent::partial("hello", vec![TimedItem::new(1.0, 1.4)]),
        TranscriptEvent::finalized(
            "hello world",
            vec![TimedItem::new(1.0, 1.5), TimedItem::new(1.5, 2.2)],
        ),
        TranscriptEvent::finalized("second cue", vec![TimedItem::new(2.2, 3.0)]),
    ]);
    let (mut ws, metrics) = start_server(source, backend).await;

    ws.send(Message::Text(request_json(None))).await.unwrap();
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::event(SessionEvent::DownloadComplete))
    );

    ws.send(Message::Text(
        r#"{"action": "start_transcription"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::status("Starting transcription..."))
    );
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::subtitle(
            "00:00:01.000 --> 00:00:02.200\nhello world\n\n"
        ))
    );
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::subtitle(
            "00:00:02.200 --> 00:00:03.000\nsecond cue\n\n"
        ))
    );

    // Stream exhausted without a stop request: connection winds down
    // without a transcription_stopped event.
    assert_eq!(next_message(&mut ws).await, None);
    assert_eq!(metrics.names(), vec!["DownloadTime", "SessionDuration"]);
}

#[tokio::test]
async fn srt_format_numbers_cues_sequentially() {
    let source = MockChunkSource::new().with_chunks(vec![vec![0u8; 32000]]);
    let backend = MockTranscribeBackend::new().with_events(vec![
        TranscriptEvent::finalized("first", vec![TimedItem::new(0.0, 1.0)]),
        TranscriptEvent::finalized("second", vec![TimedItem::new(1.0, 2.5)]),
    ]);
    let (mut ws, _) = start_server(source, backend).await;

    ws.send(Message::Text(request_json(Some("srt"))))
        .await
        .unwrap();
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::event(SessionEvent::DownloadComplete))
    );
    ws.send(Message::Text(
        r#"{"action": "start_transcription"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::status("Starting transcription..."))
    );
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::subtitle(
            "1\n00:00:00,000 --> 00:00:01,000\nfirst\n\n"
        ))
    );
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::subtitle(
            "2\n00:00:01,000 --> 00:00:02,500\nsecond\n\n"
        ))
    );
}

#[tokio::test]
async fn stop_before_start_ends_session_without_subtitles() {
    let source = MockChunkSource::new().with_chunks(vec![vec![0u8; 32000]]);
    let backend = MockTranscribeBackend::new().with_events(vec![TranscriptEvent::finalized(
        "never delivered",
        vec![TimedItem::new(0.0, 1.0)],
    )]);
    let (mut ws, _) = start_server(source, backend).await;

    ws.send(Message::Text(request_json(None))).await.unwrap();
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::event(SessionEvent::DownloadComplete))
    );

    ws.send(Message::Text(
        r#"{"action": "stop_transcription"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::event(SessionEvent::TranscriptionStopped))
    );
    assert_eq!(next_message(&mut ws).await, None);
}

#[tokio::test]
async fn unknown_asset_reports_exact_error_and_nothing_further() {
    let (mut ws, _) = start_server(MockChunkSource::new(), MockTranscribeBackend::new()).await;

    let request = r#"{
        "uuid": "does-not-exist",
        "source_locale": "en-US",
        "target_locale": "en-IN",
        "request_type": "transcription"
    }"#;
    ws.send(Message::Text(request.to_string())).await.unwrap();

    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::error("Invalid UUID or asset not found."))
    );
    assert_eq!(next_message(&mut ws).await, None);
}

#[tokio::test]
async fn unsupported_request_type_reports_exact_error() {
    let (mut ws, _) = start_server(MockChunkSource::new(), MockTranscribeBackend::new()).await;

    let request = format!(
        r#"{{"uuid": "{}", "source_locale": "en-US", "target_locale": "en-IN",
            "request_type": "translation"}}"#,
        ASSET
    );
    ws.send(Message::Text(request)).await.unwrap();

    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::error("Unsupported request type."))
    );
}

#[tokio::test]
async fn mid_stream_stop_sends_stopped_event_and_releases_decoder() {
    let source = MockChunkSource::new().with_chunks(vec![vec![0u8; 32000]; 1000]);
    let released = source.released_probe();
    let backend = MockTranscribeBackend::new()
        .with_events(vec![
            TranscriptEvent::finalized("one", vec![TimedItem::new(0.0, 1.0)]),
            TranscriptEvent::finalized("two", vec![TimedItem::new(1.0, 2.0)]),
            TranscriptEvent::finalized("three", vec![TimedItem::new(2.0, 3.0)]),
        ])
        .emit_before_audio();
    let (mut ws, _) = start_server(source, backend).await;

    ws.send(Message::Text(request_json(None))).await.unwrap();
    assert_eq!(
        next_message(&mut ws).await,
        Some(ServerMessage::event(SessionEvent::DownloadComplete))
    );
    ws.send(Message::Text(
        r#"{"action": "start_transcription"}"#.to_string(),
    ))
    .await
    .unwrap();
    ws.send(Message::Text(
        r#"{"action": "stop_transcription"}"#.to_string(),
    ))
    .await
    .unwrap();

    // Everything up to the stopped event must be a status frame or a
    // subtitle; the stopped event is terminal.
    let mut saw_stopped = false;
    while let Some(msg) = next_message(&mut ws).await {
        match msg {
            ServerMessage::Event { event } => {
                assert_eq!(event, SessionEvent::TranscriptionStopped);
                saw_stopped = true;
                break;
            }
            ServerMessage::Status { .. } | ServerMessage::Subtitle { .. } => {}
            other => panic!("unexpected message: {:?}", other),
        }
    }
    assert!(saw_stopped);

    // The decoder is released once the session winds down.
    assert_eq!(next_message(&mut ws).await, None);
    assert!(released.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn malformed_request_reports_error() {
    let (mut ws, _) = start_server(MockChunkSource::new(), MockTranscribeBackend::new()).await;

    ws.send(Message::Text("{not json".to_string()))
        .await
        .unwrap();

    match next_message(&mut ws).await {
        Some(ServerMessage::Error { error }) => {
            assert!(error.starts_with("Malformed request:"), "got: {}", error);
        }
        other => panic!("expected error frame, got {:?}", other),
    }
}
