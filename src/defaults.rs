//! Default configuration constants for subwire.
//!
//! Shared constants used across configuration types and session handling,
//! kept in one place to ensure consistency.

/// Default audio sample rate in Hz.
///
/// 16kHz mono 16-bit PCM is the fixed encoding negotiated with the
/// transcription service. The audio source adapter and the transcription
/// bridge must agree on this value; it is a configuration invariant,
/// not re-negotiated at runtime.
pub const SAMPLE_RATE: u32 = 16000;

/// Default audio chunk size in bytes.
///
/// 32000 bytes is roughly one second of 16-bit mono PCM at 16kHz.
pub const CHUNK_SIZE: usize = 32000;

/// Default server bind address.
pub const BIND_ADDR: &str = "127.0.0.1:8765";

/// Default ffmpeg binary name, resolved via PATH.
pub const FFMPEG_BIN: &str = "ffmpeg";

/// Default subtitle format when the client omits `subtitle_format`.
pub const SUBTITLE_FORMAT: &str = "webvtt";

/// Default language code passed to the transcription service when the
/// client's source locale is empty.
pub const LANGUAGE_CODE: &str = "en-US";

/// Metric namespace for all emitted metrics.
pub const METRIC_NAMESPACE: &str = "OnDemandTranscription";

/// Metric name for asset resolution time.
pub const METRIC_DOWNLOAD_TIME: &str = "DownloadTime";

/// Metric name for total session duration.
pub const METRIC_SESSION_DURATION: &str = "SessionDuration";

/// Bound of the audio input channel between the bridge and the
/// transcription stream.
///
/// A small bound keeps backpressure tight: the audio feeder suspends as
/// soon as the service stops accepting chunks.
pub const AUDIO_CHANNEL_BOUND: usize = 8;

/// Bound of the transcript event channel between the backend and the
/// bridge.
pub const EVENT_CHANNEL_BOUND: usize = 32;
