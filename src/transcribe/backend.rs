//! Transcription backend seam.
//!
//! A backend opens one streaming session per transcription run. The session
//! is a pair of lazy channels: a bounded audio input (push suspends when the
//! service is not ready, dropping the sender signals end-of-input exactly
//! once) and an inbound transcript event sequence that ends when the remote
//! stream closes. Abnormal termination travels in-band as an `Err` item.

use crate::defaults;
use crate::error::{Result, SubwireError};
use crate::transcribe::event::TranscriptEvent;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// An open streaming session with the transcription service.
pub struct TranscribeStream {
    /// Audio chunk input; drop to signal end-of-input.
    pub audio_tx: mpsc::Sender<Vec<u8>>,
    /// Inbound transcript events until the stream closes.
    pub events: mpsc::Receiver<Result<TranscriptEvent>>,
}

impl TranscribeStream {
    /// Create the channel pair for a session, handing back the service-side
    /// ends for the backend to drive.
    pub fn channel() -> (
        Self,
        mpsc::Receiver<Vec<u8>>,
        mpsc::Sender<Result<TranscriptEvent>>,
    ) {
        let (audio_tx, audio_rx) = mpsc::channel(defaults::AUDIO_CHANNEL_BOUND);
        let (event_tx, event_rx) = mpsc::channel(defaults::EVENT_CHANNEL_BOUND);
        (
            Self {
                audio_tx,
                events: event_rx,
            },
            audio_rx,
            event_tx,
        )
    }
}

/// Trait for streaming transcription backends.
///
/// This trait allows swapping implementations (remote service vs mock).
/// The audio encoding is fixed at 16-bit PCM, 16kHz mono; only the language
/// varies per session.
#[async_trait]
pub trait TranscribeBackend: Send + Sync {
    /// Open a streaming session for the given language code.
    async fn open_stream(&self, language: &str) -> Result<TranscribeStream>;
}

/// Mock transcription backend for testing.
///
/// Drains the audio input, then emits a scripted sequence of events.
pub struct MockTranscribeBackend {
    events: Vec<Result<TranscriptEvent>>,
    fail_open: bool,
    emit_before_audio: bool,
    chunks_received: Arc<AtomicUsize>,
    opened_language: Arc<std::sync::Mutex<Option<String>>>,
}

impl MockTranscribeBackend {
    /// Create a mock backend that emits no events.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            fail_open: false,
            emit_before_audio: false,
            chunks_received: Arc::new(AtomicUsize::new(0)),
            opened_language: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    /// Configure the scripted events, emitted after audio input ends.
    pub fn with_events(mut self, events: Vec<TranscriptEvent>) -> Self {
        self.events = events.into_iter().map(Ok).collect();
        self
    }

    /// Append an in-band stream failure after the scripted events.
    pub fn with_stream_failure(mut self, message: &str) -> Self {
        self.events.push(Err(SubwireError::Transcription {
            message: message.to_string(),
        }));
        self
    }

    /// Configure `open_stream` to fail.
    pub fn with_open_failure(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Emit events as soon as the stream opens, concurrently with audio
    /// input, instead of waiting for end-of-input.
    pub fn emit_before_audio(mut self) -> Self {
        self.emit_before_audio = true;
        self
    }

    /// Probe counting audio chunks the mock service consumed.
    pub fn chunks_received_probe(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.chunks_received)
    }

    /// Language passed to the last `open_stream` call.
    pub fn opened_language(&self) -> Option<String> {
        self.opened_language
            .lock()
            .ok()
            .and_then(|language| language.clone())
    }
}

impl Default for MockTranscribeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscribeBackend for MockTranscribeBackend {
    async fn open_stream(&self, language: &str) -> Result<TranscribeStream> {
        if let Ok(mut opened) = self.opened_language.lock() {
            *opened = Some(language.to_string());
        }
        if self.fail_open {
            return Err(SubwireError::Transcription {
                message: "mock backend refused to open stream".to_string(),
            });
        }

        let (stream, mut audio_rx, event_tx) = TranscribeStream::channel();
        let events: Vec<Result<TranscriptEvent>> = self
            .events
            .iter()
            .map(|r| match r {
                Ok(event) => Ok(event.clone()),
                Err(e) => Err(SubwireError::Transcription {
                    message: e.to_string(),
                }),
            })
            .collect();
        let counter = Arc::clone(&self.chunks_received);
        let emit_before_audio = self.emit_before_audio;

        tokio::spawn(async move {
            if emit_before_audio {
                for event in events {
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }
                while audio_rx.recv().await.is_some() {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                return;
            }

            while audio_rx.recv().await.is_some() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            for event in events {
                if event_tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(stream)
    }
}
