//! Cancellation listener: watches the client connection for a stop action
//! while transcription is running.

use crate::session::protocol::{ControlAction, ControlMessage};
use crate::session::state::CancelFlag;
use crate::session::transport::FrameSource;
use tracing::{debug, info};

/// Receive control messages until a stop request, a clean close, or a
/// receive error.
///
/// A stop request sets the shared flag and returns. Clean close and
/// receive errors also return — the listener never fails the session.
/// Frames that are not control messages are ignored.
pub async fn watch(rx: &mut dyn FrameSource, flag: &CancelFlag) {
    loop {
        match rx.recv().await {
            Ok(Some(frame)) => {
                if let Ok(msg) = ControlMessage::from_json(&frame)
                    && msg.action == ControlAction::StopTranscription
                {
                    info!("stop requested during transcription");
                    flag.set();
                    return;
                }
            }
            Ok(None) => {
                info!("connection closed gracefully during stop watch");
                return;
            }
            Err(e) => {
                debug!(error = %e, "stop watch ended on receive error");
                return;
            }
        }
    }
}
