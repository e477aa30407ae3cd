//! Connection lifecycle management.
//!
//! One [`ConnectionManager`] owns the single logical connection per process.
//! Commands call [`ConnectionManager::ensure_connected`] before sending, so
//! a connection to the currently configured address is lazily opened, reused
//! while the address is unchanged, and replaced when it changes. On every
//! transport open exactly one credential message is sent.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use sgu_proto::{Request, RequestBuilder};

use crate::config::ConfigStore;
use crate::error::ClientError;
use crate::handler::MessageHandler;
use crate::host::{DisplaySink, PlayerHandle};
use crate::state::{AtomicConnectionState, ConnectionState};
use crate::transport::{EventSource, FrameSender, Transport, TransportEvent};

/// Close status code for a user-requested disconnect.
const CLOSE_CODE_NORMAL: u16 = 1000;
/// Close reason for a user-requested disconnect.
const CLOSE_REASON: &str = "closing";
/// Default bound on how long a dial may take.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credential sent in the handshake immediately after transport open.
///
/// Derived from the stored access key: when one is present the client
/// authenticates with it, otherwise it introduces itself by username so the
/// service can issue a key. Exactly one credential is sent per open, never
/// both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// First contact: introduce by username.
    Username(String),
    /// Returning client: present the stored access key.
    Uuid(String),
}

impl AuthCredential {
    /// Derive the credential for this connection open.
    ///
    /// An empty stored key counts as absent.
    #[must_use]
    pub fn derive(username: &str, access_key: Option<&str>) -> Self {
        match access_key {
            Some(key) if !key.is_empty() => Self::Uuid(key.to_string()),
            _ => Self::Username(username.to_string()),
        }
    }

    /// The handshake request for this credential.
    #[must_use]
    pub fn to_request(&self) -> Request {
        match self {
            Self::Username(name) => RequestBuilder::new("auth-username")
                .field_str("username", name.clone())
                .build(),
            Self::Uuid(key) => RequestBuilder::new("auth-uuid")
                .field_str("uuid", key.clone())
                .build(),
        }
    }
}

/// Owns the logical connection and its state machine.
///
/// Owned by the command-dispatch context; the reader task it spawns shares
/// only the atomic state and the message handler.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    config: Arc<dyn ConfigStore>,
    display: Arc<dyn DisplaySink>,
    player: Arc<dyn PlayerHandle>,
    handler: Arc<MessageHandler>,
    state: Arc<AtomicConnectionState>,
    connected_addr: Option<String>,
    sender: Option<T::Sender>,
    reader: Option<JoinHandle<()>>,
    connect_timeout: Option<Duration>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager. No connection is made until the first
    /// [`ensure_connected`](Self::ensure_connected).
    #[must_use]
    pub fn new(
        transport: T,
        config: Arc<dyn ConfigStore>,
        display: Arc<dyn DisplaySink>,
        player: Arc<dyn PlayerHandle>,
    ) -> Self {
        let handler = Arc::new(MessageHandler::new(Arc::clone(&display), Arc::clone(&config)));
        Self {
            transport,
            config,
            display,
            player,
            handler,
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected)),
            connected_addr: None,
            sender: None,
            reader: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        }
    }

    /// Bound the dial, or wait indefinitely with `None`.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// The address of the live connection, if any.
    #[must_use]
    pub fn connected_address(&self) -> Option<&str> {
        self.connected_addr.as_deref()
    }

    /// Bring the connection to `Open` against the currently configured
    /// address.
    ///
    /// Idempotent fast path: already `Open` to the configured address is a
    /// no-op. An address change discards the old connection and dials the
    /// new one. Blocks the calling context until the transport reports open
    /// or error, or the configured timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a WebSocket URI, the dial
    /// fails or times out, or the handshake cannot be sent. Failure leaves
    /// the state `Disconnected`; the next call starts a fresh attempt.
    pub async fn ensure_connected(&mut self) -> Result<(), ClientError> {
        let address = self.config.address();
        if self.state.load() == ConnectionState::Open
            && self.connected_addr.as_deref() == Some(address.as_str())
        {
            return Ok(());
        }

        // Stale, closed, or differently-addressed connection: replace it.
        self.teardown();

        if !address.starts_with("ws://") && !address.starts_with("wss://") {
            let err = ClientError::Config(format!(
                "invalid service address: {address}, must start with ws:// or wss://"
            ));
            self.display.show(&format!("Connection failed: {err}"));
            return Err(err);
        }

        self.display.show(&format!("Connecting to address: {address}"));
        debug!(address = %address, "Dialing service");
        self.state.store(ConnectionState::Connecting);

        let dial = self.transport.connect(&address);
        let dialed = match self.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, dial).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Connection(format!(
                    "connect to {address} timed out after {}s",
                    limit.as_secs()
                ))),
            },
            None => dial.await,
        };

        let (mut sender, events) = match dialed {
            Ok(halves) => halves,
            Err(e) => {
                self.state.store(ConnectionState::Disconnected);
                warn!(address = %address, error = %e, "Connect failed");
                self.display.show(&format!("Connection failed: {e}"));
                return Err(e);
            }
        };

        // Handshake: exactly one credential message per open.
        let credential =
            AuthCredential::derive(&self.player.username(), self.config.access_key().as_deref());
        if let Err(e) = sender.send_text(credential.to_request().to_json()?).await {
            self.state.store(ConnectionState::Disconnected);
            self.display.show(&format!("Connection failed: {e}"));
            return Err(e);
        }

        self.reader = Some(tokio::spawn(read_loop(
            events,
            Arc::clone(&self.handler),
            Arc::clone(&self.state),
        )));
        self.sender = Some(sender);
        self.connected_addr = Some(address);
        self.state.store(ConnectionState::Open);
        debug!("Connection open");
        Ok(())
    }

    /// Transmit a request, connecting first if the connection is not open.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting fails or the transport rejects the
    /// frame; a send failure leaves the state `Disconnected`.
    pub async fn send(&mut self, request: &Request) -> Result<(), ClientError> {
        if self.state.load() != ConnectionState::Open {
            self.ensure_connected().await?;
        }
        let json = request.to_json()?;
        let Some(sender) = self.sender.as_mut() else {
            return Err(ClientError::Connection("no live connection".into()));
        };
        debug!(kind = request.kind(), "Sending request");
        if let Err(e) = sender.send_text(json).await {
            warn!(kind = request.kind(), error = %e, "Send failed");
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    /// Request a graceful close. No-op if already closed.
    ///
    /// The transport's close confirmation, observed by the reader task,
    /// moves the state to `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        match self.state.load() {
            ConnectionState::Disconnected | ConnectionState::Closing => return Ok(()),
            ConnectionState::Connecting | ConnectionState::Open => {}
        }
        self.state.store(ConnectionState::Closing);
        self.connected_addr = None;
        if let Some(mut sender) = self.sender.take() {
            sender.close(CLOSE_CODE_NORMAL, CLOSE_REASON).await?;
        }
        Ok(())
    }

    /// Drop the current connection without a close handshake.
    fn teardown(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.sender = None;
        self.connected_addr = None;
        self.state.store(ConnectionState::Disconnected);
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Drains transport events until the connection ends.
async fn read_loop<E: EventSource>(
    mut events: E,
    handler: Arc<MessageHandler>,
    state: Arc<AtomicConnectionState>,
) {
    while let Some(event) = events.next_event().await {
        match event {
            TransportEvent::Frame(text) => handler.on_frame(&text),
            TransportEvent::Closed { code, reason } => {
                handler.on_closed(code, &reason);
                state.store(ConnectionState::Disconnected);
                return;
            }
            TransportEvent::Error(message) => {
                handler.on_error(&message);
                state.store(ConnectionState::Disconnected);
                return;
            }
        }
    }
    // Stream ended without a close frame.
    state.store(ConnectionState::Disconnected);
}
