//! Streaming channel
//!
//! One persistent WebSocket connection per exchange. The connection is
//! acquired by [`ChannelConnector::open`] and released by
//! [`StreamChannel::close`]; [`ScopedChannel`] makes sure the release
//! happens exactly once, including when the exchange future is dropped.

use crate::config::Credentials;
use crate::models::stream::{InboundFrame, OutboundRequest};
use crate::utils::error::{
    helpers::{protocol_error, transport_error},
    AdapterResult, ErrorContext,
};
use crate::utils::logging::create_request_log_summary;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// An open bidirectional connection to the streaming endpoint
#[async_trait]
pub trait StreamChannel: Send {
    /// Write the request frame
    async fn send(&mut self, request: &OutboundRequest) -> AdapterResult<()>;

    /// Wait for the next inbound frame
    async fn receive(&mut self) -> AdapterResult<InboundFrame>;

    /// Release the connection. Idempotent and infallible.
    async fn close(&mut self);
}

/// Opens streaming channels
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn open(&self, credentials: &Credentials) -> AdapterResult<Box<dyn StreamChannel>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    Open,
    PeerClosed,
    Closed,
}

/// WebSocket implementation of [`StreamChannel`]
pub struct WsChannel {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: ChannelState,
    /// Upper bound on the close handshake
    close_timeout: Duration,
}

impl WsChannel {
    fn ensure_open(&self) -> AdapterResult<()> {
        match self.state {
            ChannelState::Open => Ok(()),
            ChannelState::PeerClosed => Err(transport_error("connection was closed by the peer")),
            ChannelState::Closed => Err(transport_error("channel is closed")),
        }
    }
}

#[async_trait]
impl StreamChannel for WsChannel {
    async fn send(&mut self, request: &OutboundRequest) -> AdapterResult<()> {
        self.ensure_open()?;

        let payload = serde_json::to_string(request)
            .transport_context("Failed to encode request frame")?;
        debug!("Sending request frame: {}", create_request_log_summary(request));

        self.socket
            .send(Message::Text(payload))
            .await
            .transport_context("Failed to write request frame")
    }

    async fn receive(&mut self) -> AdapterResult<InboundFrame> {
        self.ensure_open()?;

        loop {
            let message = match self.socket.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    self.state = ChannelState::PeerClosed;
                    return Err(transport_error(format!("connection failed: {}", e)));
                }
                None => {
                    self.state = ChannelState::PeerClosed;
                    return Err(transport_error("connection closed before the terminal frame"));
                }
            };

            match message {
                Message::Text(text) => return InboundFrame::parse(&text),
                Message::Binary(bytes) => {
                    let text = String::from_utf8(bytes).map_err(|e| {
                        protocol_error(
                            format!("binary frame is not valid UTF-8: {}", e.utf8_error()),
                            String::from_utf8_lossy(e.as_bytes()),
                        )
                    })?;
                    return InboundFrame::parse(&text);
                }
                Message::Close(frame) => {
                    self.state = ChannelState::PeerClosed;
                    let reason = frame
                        .map(|f| format!(" ({}: {})", u16::from(f.code), f.reason))
                        .unwrap_or_default();
                    return Err(transport_error(format!(
                        "peer closed the connection before the terminal frame{}",
                        reason
                    )));
                }
                // Pings are answered by the socket on the next read
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if self.state == ChannelState::Closed {
            return;
        }
        self.state = ChannelState::Closed;

        match tokio::time::timeout(self.close_timeout, self.socket.close(None)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Close handshake did not complete: {}", e),
            Err(_) => debug!("Close handshake timed out after {:?}", self.close_timeout),
        }
    }
}

/// Connects [`WsChannel`]s to `{stream_base}/ws?token=...`
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl ChannelConnector for WsConnector {
    async fn open(&self, credentials: &Credentials) -> AdapterResult<Box<dyn StreamChannel>> {
        let url = credentials.stream_url()?;
        // The query string carries the token
        let host = url.host_str().unwrap_or("unknown").to_string();
        debug!("Opening stream connection to {}", host);

        let (socket, _response) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| transport_error(format!(
                "connecting to {} timed out after {:?}",
                host, self.connect_timeout
            )))?
            .transport_context("Failed to open stream connection")?;

        Ok(Box::new(WsChannel {
            socket,
            state: ChannelState::Open,
            close_timeout: self.connect_timeout,
        }))
    }
}

/// Owns a channel for the duration of one exchange
///
/// Call [`ScopedChannel::close`] on every path that still runs. If the
/// exchange is cancelled instead, `Drop` hands the channel to the runtime to
/// be closed in the background.
pub struct ScopedChannel {
    inner: Option<Box<dyn StreamChannel>>,
}

impl ScopedChannel {
    pub fn new(channel: Box<dyn StreamChannel>) -> Self {
        Self { inner: Some(channel) }
    }

    /// Borrow the open channel
    pub fn channel(&mut self) -> AdapterResult<&mut (dyn StreamChannel + 'static)> {
        self.inner
            .as_deref_mut()
            .ok_or_else(|| transport_error("channel is closed"))
    }

    /// Close the channel and release it
    pub async fn close(mut self) {
        if let Some(mut channel) = self.inner.take() {
            channel.close().await;
        }
    }
}

impl Drop for ScopedChannel {
    fn drop(&mut self) {
        if let Some(mut channel) = self.inner.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    warn!("Exchange abandoned with an open channel, closing it in the background");
                    handle.spawn(async move {
                        channel.close().await;
                    });
                }
                Err(_) => warn!("Exchange abandoned outside a runtime, dropping the channel"),
            }
        }
    }
}
