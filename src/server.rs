//! WebSocket server: accepts connections and runs one session per client.

use crate::error::{Result, SubwireError};
use crate::session::transport::{FrameSink, FrameSource};
use crate::session::{SessionServices, handle_session};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{WebSocketStream, accept_async};
use tracing::{debug, error, info};

/// Receiving half of a WebSocket connection as a [`FrameSource`].
///
/// Only text frames carry protocol messages; binary frames and
/// ping/pong are skipped.
pub struct WsFrameSource<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> FrameSource for WsFrameSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => return Ok(None),
                Some(Err(e)) => {
                    return Err(SubwireError::Connection {
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Sending half of a WebSocket connection as a [`FrameSink`].
pub struct WsFrameSink<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
}

#[async_trait]
impl<S> FrameSink for WsFrameSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: &str) -> Result<()> {
        self.inner
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| SubwireError::Connection {
                message: e.to_string(),
            })
    }
}

/// Split an accepted WebSocket into the session-facing transport halves.
pub fn split_transport<S>(ws: WebSocketStream<S>) -> (WsFrameSource<S>, WsFrameSink<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let (sink, stream) = ws.split();
    (WsFrameSource { inner: stream }, WsFrameSink { inner: sink })
}

/// The transcription relay server.
pub struct Server {
    listener: TcpListener,
    services: Arc<SessionServices>,
}

impl Server {
    /// Bind the listening socket. The server does not accept connections
    /// until [`run`](Self::run) is called.
    pub async fn bind(addr: &str, services: Arc<SessionServices>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, services })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one spawned session per client.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening for connections");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let services = Arc::clone(&self.services);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, peer, &services).await {
                    error!(%peer, error = %e, "connection failed");
                }
            });
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    services: &SessionServices,
) -> Result<()> {
    info!(%peer, "client connected");
    let ws = accept_async(stream)
        .await
        .map_err(|e| SubwireError::Connection {
            message: format!("handshake failed: {}", e),
        })?;

    let (mut rx, mut tx) = split_transport(ws);
    handle_session(&mut rx, &mut tx, services).await;

    debug!(%peer, "session ended");
    Ok(())
}
