//! Transcription bridge: pumps audio into an open streaming session while
//! draining transcript events into a caller-supplied sink.
//!
//! Both directions run concurrently; either finishing or failing winds the
//! other down, and the audio source is released on every exit path. The
//! sink signals wind-down with a tagged [`SinkFlow`] result rather than an
//! error, so "stop requested" is ordinary control flow.

use crate::audio::AudioChunkSource;
use crate::error::Result;
use crate::transcribe::backend::{TranscribeBackend, TranscribeStream};
use crate::transcribe::event::TranscriptEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Sink decision after each delivered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFlow {
    /// Keep delivering results.
    Continue,
    /// Stop promptly: no further chunks pushed, no further events consumed.
    Stop,
}

/// How a bridge run ended (absent an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The event stream was exhausted normally.
    Completed,
    /// The sink requested termination.
    Stopped,
}

/// Receiver of finalized transcript spans.
#[async_trait]
pub trait TranscriptSink: Send {
    /// Accept one finalized result.
    ///
    /// `start` and `end` are offsets in seconds relative to stream start,
    /// with `start <= end`.
    async fn accept(&mut self, text: &str, start: f64, end: f64) -> Result<SinkFlow>;
}

/// Run one transcription session over `source`, delivering finalized
/// results to `sink`.
///
/// Opens a stream on `backend` for `language` (the 16-bit PCM 16kHz mono
/// encoding is a configuration invariant shared with the audio source),
/// then concurrently feeds audio and drains events. Fails with a
/// transcription error if the session cannot be opened or the stream
/// terminates abnormally.
pub async fn run(
    source: &mut dyn AudioChunkSource,
    backend: &dyn TranscribeBackend,
    language: &str,
    sink: &mut dyn TranscriptSink,
) -> Result<BridgeOutcome> {
    let TranscribeStream {
        audio_tx,
        mut events,
    } = match backend.open_stream(language).await {
        Ok(stream) => stream,
        Err(e) => {
            source.stop().await.ok();
            return Err(e);
        }
    };

    let outcome = pump(source, audio_tx, &mut events, sink).await;

    // Release the decoder no matter how the pump ended.
    let stop_result = source.stop().await;
    let outcome = outcome?;
    stop_result?;
    Ok(outcome)
}

/// Drive both directions until the event stream ends, the sink stops the
/// session, or either side fails.
async fn pump(
    source: &mut dyn AudioChunkSource,
    audio_tx: mpsc::Sender<Vec<u8>>,
    events: &mut mpsc::Receiver<Result<TranscriptEvent>>,
    sink: &mut dyn TranscriptSink,
) -> Result<BridgeOutcome> {
    let feed = feed_audio(source, audio_tx);
    tokio::pin!(feed);
    let mut feed_done = false;

    loop {
        tokio::select! {
            result = &mut feed, if !feed_done => {
                result?;
                feed_done = true;
            }
            item = events.recv() => match item {
                Some(Ok(event)) => {
                    if deliver(&event, sink).await? == SinkFlow::Stop {
                        return Ok(BridgeOutcome::Stopped);
                    }
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(BridgeOutcome::Completed),
            }
        }
    }
}

/// Push audio chunks until the source is exhausted, then signal
/// end-of-input by dropping the sender.
async fn feed_audio(
    source: &mut dyn AudioChunkSource,
    audio_tx: mpsc::Sender<Vec<u8>>,
) -> Result<()> {
    while let Some(chunk) = source.next_chunk().await? {
        if audio_tx.send(chunk).await.is_err() {
            // Service closed its input side; the event stream reports why.
            break;
        }
    }
    Ok(())
}

/// Deliver the finalized results of one event to the sink.
///
/// Partials are skipped. Only the first alternative of a final result is
/// used, and it is skipped when its trimmed text is empty or it carries no
/// timed items; the cue span is first item start to last item end. This
/// best-alternative policy matches the service contract deliberately.
async fn deliver(event: &TranscriptEvent, sink: &mut dyn TranscriptSink) -> Result<SinkFlow> {
    for result in &event.results {
        if result.is_partial {
            continue;
        }
        let Some(alt) = result.alternatives.first() else {
            continue;
        };
        let text = alt.transcript.trim();
        if text.is_empty() {
            continue;
        }
        let (Some(first), Some(last)) = (alt.items.first(), alt.items.last()) else {
            continue;
        };
        if sink.accept(text, first.start_time, last.end_time).await? == SinkFlow::Stop {
            return Ok(SinkFlow::Stop);
        }
    }
    Ok(SinkFlow::Continue)
}

/// Sink that collects accepted results, optionally stopping the session
/// after a fixed number of cues. Useful in tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingSink {
    accepted: Vec<(String, f64, f64)>,
    stop_after: Option<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `SinkFlow::Stop` once `n` results have been accepted.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }

    pub fn accepted(&self) -> &[(String, f64, f64)] {
        &self.accepted
    }
}

#[async_trait]
impl TranscriptSink for CollectingSink {
    async fn accept(&mut self, text: &str, start: f64, end: f64) -> Result<SinkFlow> {
        if let Some(limit) = self.stop_after
            && self.accepted.len() >= limit
        {
            return Ok(SinkFlow::Stop);
        }
        self.accepted.push((text.to_string(), start, end));
        if let Some(limit) = self.stop_after
            && self.accepted.len() >= limit
        {
            return Ok(SinkFlow::Stop);
        }
        Ok(SinkFlow::Continue)
    }
}
