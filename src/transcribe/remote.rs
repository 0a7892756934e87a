//! WebSocket transcription backend.
//!
//! Speaks a simple streaming protocol: one JSON text frame configures the
//! session (language, fixed PCM encoding), audio follows as binary frames,
//! an empty binary frame marks end-of-input, and the service streams
//! transcript events back as JSON text frames until it closes.

use crate::error::{Result, SubwireError};
use crate::transcribe::backend::{TranscribeBackend, TranscribeStream};
use crate::transcribe::event::TranscriptEvent;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Session start frame sent as the first text message.
#[derive(Debug, Serialize)]
struct StartFrame<'a> {
    language: &'a str,
    sample_rate: u32,
    encoding: &'static str,
    channels: u16,
}

/// Transcription backend connecting to a remote WebSocket service.
pub struct RemoteTranscribeBackend {
    endpoint: String,
    sample_rate: u32,
}

impl RemoteTranscribeBackend {
    pub fn new(endpoint: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            sample_rate,
        }
    }
}

#[async_trait]
impl TranscribeBackend for RemoteTranscribeBackend {
    async fn open_stream(&self, language: &str) -> Result<TranscribeStream> {
        let (ws, _response) =
            connect_async(&self.endpoint)
                .await
                .map_err(|e| SubwireError::Transcription {
                    message: format!("failed to connect to {}: {}", self.endpoint, e),
                })?;
        let (mut write, mut read) = ws.split();

        let start = StartFrame {
            language,
            sample_rate: self.sample_rate,
            encoding: "pcm_s16le",
            channels: 1,
        };
        let payload = serde_json::to_string(&start).map_err(|e| SubwireError::Transcription {
            message: format!("failed to encode start frame: {}", e),
        })?;
        write
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| SubwireError::Transcription {
                message: format!("failed to send start frame: {}", e),
            })?;

        let (stream, mut audio_rx, event_tx) = TranscribeStream::channel();

        // Outbound: relay audio chunks, then the empty end-of-input frame.
        tokio::spawn(async move {
            while let Some(chunk) = audio_rx.recv().await {
                if write.send(Message::Binary(chunk.into())).await.is_err() {
                    return;
                }
            }
            write.send(Message::Binary(Vec::new().into())).await.ok();
        });

        // Inbound: decode transcript events until the service closes.
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let item = serde_json::from_str::<TranscriptEvent>(&text).map_err(|e| {
                            SubwireError::Transcription {
                                message: format!("undecodable transcript event: {}", e),
                            }
                        });
                        let failed = item.is_err();
                        if event_tx.send(item).await.is_err() || failed {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => return,
                    Ok(_) => {}
                    Err(e) => {
                        event_tx
                            .send(Err(SubwireError::Transcription {
                                message: format!("transcription stream broke: {}", e),
                            }))
                            .await
                            .ok();
                        return;
                    }
                }
            }
        });

        Ok(stream)
    }
}
