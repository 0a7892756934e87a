//! Subtitle cue formatting.

pub mod format;

pub use format::{SubtitleFormat, format_cue, format_timestamp};
