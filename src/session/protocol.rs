//! JSON message protocol between client and server.
//!
//! All frames are JSON text messages over the persistent connection. The
//! client opens with a request descriptor and then steers the session with
//! control messages; the server answers with single-key frames (`error`,
//! `event`, `status`, `subtitle`).

use serde::{Deserialize, Serialize};

/// Status line sent when transcription begins.
pub const STATUS_STARTING: &str = "Starting transcription...";

/// Initial request descriptor sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    pub uuid: String,
    pub source_locale: String,
    /// Validated but unused downstream.
    pub target_locale: String,
    pub request_type: String,
    /// Subtitle format name; omitted means webvtt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_format: Option<String>,
}

impl ClientRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Control action sent by the client after the initial request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    StartTranscription,
    StopTranscription,
    /// Unrecognized actions are ignored, not rejected.
    #[serde(other)]
    Other,
}

/// Control message wrapper: `{"action": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub action: ControlAction,
}

impl ControlMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Session lifecycle events sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    DownloadComplete,
    /// Terminal for the session.
    TranscriptionStopped,
}

/// Messages sent by the server to the client.
///
/// Untagged so that each variant serializes to its single-key frame:
/// `{"error": ...}`, `{"event": ...}`, `{"status": ...}`,
/// `{"subtitle": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Terminal for the connection.
    Error { error: String },
    Event { event: SessionEvent },
    Status { status: String },
    /// A fully formatted subtitle cue.
    Subtitle { subtitle: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: message.into(),
        }
    }

    pub fn event(event: SessionEvent) -> Self {
        ServerMessage::Event { event }
    }

    pub fn status(status: impl Into<String>) -> Self {
        ServerMessage::Status {
            status: status.into(),
        }
    }

    pub fn subtitle(cue: impl Into<String>) -> Self {
        ServerMessage::Subtitle {
            subtitle: cue.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
