//! Session orchestrator: the per-connection state machine.
//!
//! States run `AwaitingRequest → AwaitingStart → Running → Done`, with an
//! error exit from any state. All failures are caught at the session
//! boundary, logged, and reported to the client as an `{"error": ...}`
//! frame on a best-effort basis; nothing escapes to crash the process.

use crate::audio::SourceOpener;
use crate::defaults;
use crate::error::{Result, SubwireError};
use crate::metrics::{MetricSink, MetricUnit};
use crate::session::cancel;
use crate::session::protocol::{
    ClientRequest, ControlAction, ControlMessage, STATUS_STARTING, ServerMessage, SessionEvent,
};
use crate::session::sink::CueSink;
use crate::session::state::CancelFlag;
use crate::session::transport::{FrameSink, FrameSource};
use crate::storage::AssetStore;
use crate::subtitle::SubtitleFormat;
use crate::transcribe::bridge;
use crate::transcribe::{BridgeOutcome, TranscribeBackend};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Process-wide service handles shared by every session.
///
/// Constructed once at startup with explicit configuration, passed by
/// reference into each connection, never mutated afterwards.
pub struct SessionServices {
    pub assets: Arc<dyn AssetStore>,
    pub opener: Arc<dyn SourceOpener>,
    pub transcribe: Arc<dyn TranscribeBackend>,
    pub metrics: Arc<dyn MetricSink>,
    /// Language used when the client sends an empty source locale.
    pub fallback_language: String,
}

/// Drive one client session to completion.
///
/// The session boundary: any failure inside the state machine is logged
/// and reported to the client; a failure sending that final report is
/// swallowed, the connection being unusable anyway.
pub async fn handle_session(
    rx: &mut dyn FrameSource,
    tx: &mut dyn FrameSink,
    services: &SessionServices,
) {
    if let Err(e) = run_session(rx, tx, services).await {
        error!(error = %e, "session failed");
        if let Ok(report) = ServerMessage::error(e.to_string()).to_json() {
            tx.send(&report).await.ok();
        }
    }
}

async fn run_session(
    rx: &mut dyn FrameSource,
    tx: &mut dyn FrameSink,
    services: &SessionServices,
) -> Result<()> {
    // AwaitingRequest: exactly one request descriptor.
    let Some(frame) = rx.recv().await? else {
        info!("client disconnected before sending a request");
        return Ok(());
    };
    let request =
        ClientRequest::from_json(&frame).map_err(|e| SubwireError::MalformedRequest {
            message: e.to_string(),
        })?;
    let format = request
        .subtitle_format
        .as_deref()
        .map(SubtitleFormat::parse)
        .unwrap_or_default();
    info!(
        uuid = %request.uuid,
        source_locale = %request.source_locale,
        target_locale = %request.target_locale,
        request_type = %request.request_type,
        subtitle_format = format.name(),
        "session request received"
    );

    // Resolve the asset and announce readiness.
    let resolve_start = Instant::now();
    let media_path = services.assets.resolve(&request.uuid).await?;
    let resolve_secs = resolve_start.elapsed().as_secs_f64();

    if request.request_type != "transcription" {
        return Err(SubwireError::UnsupportedRequestType);
    }

    services
        .metrics
        .emit(defaults::METRIC_DOWNLOAD_TIME, resolve_secs, MetricUnit::Seconds);
    info!(path = %media_path.display(), seconds = resolve_secs, "asset resolved");
    send(tx, &ServerMessage::event(SessionEvent::DownloadComplete)).await?;

    // AwaitingStart: loop until start or stop.
    loop {
        let Some(frame) = rx.recv().await? else {
            info!("client disconnected before starting transcription");
            return Ok(());
        };
        match ControlMessage::from_json(&frame).map(|msg| msg.action) {
            Ok(ControlAction::StartTranscription) => break,
            Ok(ControlAction::StopTranscription) => {
                info!("client stopped before starting transcription");
                send(tx, &ServerMessage::event(SessionEvent::TranscriptionStopped)).await?;
                return Ok(());
            }
            // Unknown actions and undecodable frames keep the wait going
            Ok(ControlAction::Other) | Err(_) => {}
        }
    }

    // Running: bridge + cancellation listener, duration metric regardless
    // of outcome.
    let session_start = Instant::now();
    let outcome = run_transcription(rx, tx, services, &request, format, &media_path).await;
    let session_secs = session_start.elapsed().as_secs_f64();
    services
        .metrics
        .emit(defaults::METRIC_SESSION_DURATION, session_secs, MetricUnit::Seconds);
    info!(seconds = session_secs, "transcription session finished");

    if outcome? {
        send(tx, &ServerMessage::event(SessionEvent::TranscriptionStopped)).await?;
    }
    Ok(())
}

/// Run the transcription bridge concurrently with the cancellation
/// listener.
///
/// Returns whether the client cancelled. The two activities are not
/// ordered relative to each other; whichever settles first decides the
/// next step. When the bridge finishes while the client stays silent, the
/// listener is wound down with it so the pair always terminates.
async fn run_transcription(
    rx: &mut dyn FrameSource,
    tx: &mut dyn FrameSink,
    services: &SessionServices,
    request: &ClientRequest,
    format: SubtitleFormat,
    media_path: &Path,
) -> Result<bool> {
    info!("client requested to start transcription");
    send(tx, &ServerMessage::status(STATUS_STARTING)).await?;

    let language = if request.source_locale.is_empty() {
        services.fallback_language.as_str()
    } else {
        request.source_locale.as_str()
    };

    let mut source = services.opener.open(media_path).await?;
    let cancel = CancelFlag::new();
    let mut sink = CueSink::new(tx, format, cancel.clone());

    let bridge_run = bridge::run(
        source.as_mut(),
        services.transcribe.as_ref(),
        language,
        &mut sink,
    );
    let watcher = cancel::watch(rx, &cancel);
    tokio::pin!(bridge_run);
    tokio::pin!(watcher);

    let outcome = tokio::select! {
        result = &mut bridge_run => result?,
        // Listener settled first (stop or client gone): let the bridge
        // observe the flag and wind down.
        _ = &mut watcher => (&mut bridge_run).await?,
    };

    Ok(cancel.is_set() || outcome == BridgeOutcome::Stopped)
}

async fn send(tx: &mut dyn FrameSink, msg: &ServerMessage) -> Result<()> {
    tx.send(&msg.to_json()?).await
}
