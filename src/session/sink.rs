//! Cue emission: the bridge-facing sink that formats finalized results and
//! sends them to the client.

use crate::error::Result;
use crate::session::protocol::ServerMessage;
use crate::session::state::CancelFlag;
use crate::session::transport::FrameSink;
use crate::subtitle::{SubtitleFormat, format_cue};
use crate::transcribe::bridge::{SinkFlow, TranscriptSink};
use async_trait::async_trait;
use tracing::info;

/// Formats each finalized result as a cue and sends it as a
/// `{"subtitle": ...}` frame.
///
/// Owns the 1-based cue sequence counter exclusively; the counter advances
/// once per emitted cue regardless of format. Checks the shared
/// cancellation flag before every emission and winds the bridge down with
/// [`SinkFlow::Stop`] once it is set.
pub struct CueSink<'a> {
    tx: &'a mut dyn FrameSink,
    format: SubtitleFormat,
    cancel: CancelFlag,
    seq: u64,
}

impl<'a> CueSink<'a> {
    pub fn new(tx: &'a mut dyn FrameSink, format: SubtitleFormat, cancel: CancelFlag) -> Self {
        Self {
            tx,
            format,
            cancel,
            seq: 1,
        }
    }

    /// Number of cues emitted so far.
    pub fn cues_sent(&self) -> u64 {
        self.seq - 1
    }
}

#[async_trait]
impl TranscriptSink for CueSink<'_> {
    async fn accept(&mut self, text: &str, start: f64, end: f64) -> Result<SinkFlow> {
        if self.cancel.is_set() {
            return Ok(SinkFlow::Stop);
        }

        let cue = format_cue(self.format, text, start, end, self.seq);
        self.tx.send(&ServerMessage::subtitle(cue).to_json()?).await?;
        info!(seq = self.seq, text, "subtitle sent");
        self.seq += 1;
        Ok(SinkFlow::Continue)
    }
}
