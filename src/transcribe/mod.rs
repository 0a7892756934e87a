//! Streaming transcription: backend seam, event model and the bridge.

pub mod backend;
pub mod bridge;
pub mod event;
pub mod remote;

pub use backend::{MockTranscribeBackend, TranscribeBackend, TranscribeStream};
pub use bridge::{BridgeOutcome, SinkFlow, TranscriptSink};
pub use event::{Alternative, TimedItem, TranscriptEvent, TranscriptResult};
pub use remote::RemoteTranscribeBackend;
