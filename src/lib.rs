//! subwire - On-demand subtitle streaming over WebSocket
//!
//! Decodes a media asset to PCM, streams it to a remote transcription
//! service, and relays finalized results to the client as formatted
//! subtitle cues.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod metrics;
pub mod server;
pub mod session;
pub mod storage;
pub mod subtitle;
pub mod transcribe;

// Core seams (source → transcribe → sink)
pub use audio::{AudioChunkSource, SourceOpener};
pub use storage::AssetStore;
pub use transcribe::{TranscribeBackend, TranscriptSink};

// Session layer
pub use session::{SessionServices, handle_session};

// Server
pub use server::Server;

// Error handling
pub use error::{Result, SubwireError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
