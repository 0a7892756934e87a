//! Transcript event model emitted by the streaming transcription service.
//!
//! An event carries zero or more results; a result is either partial
//! (provisional, discarded downstream) or final (terminal for its time
//! span). A final result carries ranked alternatives; only the best one is
//! consumed. Alternatives carry the recognized text plus word-level timed
//! items with offsets in seconds relative to stream start.

use serde::{Deserialize, Serialize};

/// One event from the transcription stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TranscriptEvent {
    #[serde(default)]
    pub results: Vec<TranscriptResult>,
}

/// One transcription result within an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Provisional results are discarded; only finalized ones become cues.
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// One ranked hypothesis for a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default)]
    pub items: Vec<TimedItem>,
}

/// A timed unit (word or punctuation) within an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedItem {
    pub start_time: f64,
    pub end_time: f64,
}

impl TranscriptEvent {
    /// Event with a single final result and one alternative.
    pub fn finalized(transcript: &str, items: Vec<TimedItem>) -> Self {
        Self {
            results: vec![TranscriptResult {
                is_partial: false,
                alternatives: vec![Alternative {
                    transcript: transcript.to_string(),
                    items,
                }],
            }],
        }
    }

    /// Event with a single partial result and one alternative.
    pub fn partial(transcript: &str, items: Vec<TimedItem>) -> Self {
        Self {
            results: vec![TranscriptResult {
                is_partial: true,
                alternatives: vec![Alternative {
                    transcript: transcript.to_string(),
                    items,
                }],
            }],
        }
    }
}

impl TimedItem {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}
