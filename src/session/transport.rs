//! Frame transport seams for the session layer.
//!
//! The orchestrator and the cancellation listener never touch the
//! WebSocket directly; they speak to one receiving half and one sending
//! half behind these traits. The server wires in the real halves, tests
//! wire in channel-backed ones.

use crate::error::{Result, SubwireError};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Receiving half of the client connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Receive the next text frame.
    ///
    /// `Ok(None)` means the connection closed cleanly.
    async fn recv(&mut self) -> Result<Option<String>>;
}

/// Sending half of the client connection.
///
/// The orchestrator serializes all outgoing sends; at most one task writes
/// at a time.
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: &str) -> Result<()>;
}

/// Channel-backed frame source for tests.
pub struct ChannelFrameSource {
    rx: mpsc::UnboundedReceiver<Result<String>>,
}

impl ChannelFrameSource {
    /// Returns the source plus a handle for scripting inbound frames.
    /// Dropping the handle closes the connection cleanly.
    pub fn new() -> (Self, mpsc::UnboundedSender<Result<String>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    async fn recv(&mut self) -> Result<Option<String>> {
        match self.rx.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Channel-backed frame sink for tests.
pub struct ChannelFrameSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelFrameSink {
    /// Returns the sink plus the receiver observing everything sent.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelFrameSink {
    async fn send(&mut self, frame: &str) -> Result<()> {
        self.tx
            .send(frame.to_string())
            .map_err(|_| SubwireError::Connection {
                message: "send on closed connection".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_delivers_frames_then_close() {
        let (mut source, handle) = ChannelFrameSource::new();
        handle.send(Ok("one".to_string())).unwrap();
        handle.send(Ok("two".to_string())).unwrap();
        drop(handle);

        assert_eq!(source.recv().await.unwrap(), Some("one".to_string()));
        assert_eq!(source.recv().await.unwrap(), Some("two".to_string()));
        assert_eq!(source.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_channel_source_propagates_errors() {
        let (mut source, handle) = ChannelFrameSource::new();
        handle
            .send(Err(SubwireError::Connection {
                message: "reset".to_string(),
            }))
            .unwrap();

        assert!(source.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_channel_sink_records_sends() {
        let (mut sink, mut observed) = ChannelFrameSink::new();
        sink.send("hello").await.unwrap();

        assert_eq!(observed.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_channel_sink_fails_after_receiver_dropped() {
        let (mut sink, observed) = ChannelFrameSink::new();
        drop(observed);

        assert!(matches!(
            sink.send("hello").await,
            Err(SubwireError::Connection { .. })
        ));
    }
}
