//! Transport abstraction over the socket connection.
//!
//! The protocol core registers against these capability traits instead of
//! subclassing any particular socket client. [`WsTransport`] is the
//! tokio-tungstenite implementation; tests supply their own.

use std::borrow::Cow;
use std::future::Future;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::ClientError;

/// Events delivered by the transport's receive half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame arrived.
    Frame(String),
    /// The peer closed the connection.
    Closed {
        /// Close status code.
        code: u16,
        /// Close reason.
        reason: String,
    },
    /// The transport failed.
    Error(String),
}

/// Dials a logical connection.
pub trait Transport: Send + Sync {
    /// Sending half of an established connection.
    type Sender: FrameSender;
    /// Receiving half of an established connection.
    type Events: EventSource;

    /// Connect to the given address and return both halves.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<(Self::Sender, Self::Events), ClientError>> + Send;
}

/// Sending half of a connection.
pub trait FrameSender: Send + 'static {
    /// Send a text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Send a close frame with the given status code and reason.
    fn close(
        &mut self,
        code: u16,
        reason: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Receiving half of a connection, drained by the reader task.
pub trait EventSource: Send + 'static {
    /// Next transport event; `None` once the stream is exhausted.
    fn next_event(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;
}

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

/// Sending half of a WebSocket connection.
pub struct WsSender {
    write: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
}

/// Receiving half of a WebSocket connection.
pub struct WsEvents {
    read: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl Transport for WsTransport {
    type Sender = WsSender;
    type Events = WsEvents;

    async fn connect(&self, url: &str) -> Result<(WsSender, WsEvents), ClientError> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let (write, read) = ws.split();
        Ok((WsSender { write }, WsEvents { read }))
    }
}

impl FrameSender for WsSender {
    async fn send_text(&mut self, text: String) -> Result<(), ClientError> {
        self.write
            .send(Message::Text(text))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), ClientError> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: Cow::Owned(reason.to_string()),
        };
        self.write
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))
    }
}

impl EventSource for WsEvents {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.read.next().await? {
                Ok(Message::Text(text)) => return Some(TransportEvent::Frame(text)),
                Ok(Message::Close(frame)) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((1005, String::new()));
                    return Some(TransportEvent::Closed { code, reason });
                }
                // Binary, ping, and pong frames are transport-level noise.
                Ok(_) => {}
                Err(e) => return Some(TransportEvent::Error(e.to_string())),
            }
        }
    }
}
