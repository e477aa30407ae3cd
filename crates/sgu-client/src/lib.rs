//! # sgu-client
//!
//! Remote-control client for the SGU inventory/project service.
//!
//! User commands are parsed into a command tree, translated into JSON
//! requests by the [`router::CommandRouter`], and sent over a persistent
//! WebSocket connection owned by [`connection::ConnectionManager`]. Inbound
//! frames arrive asynchronously and are rendered to the injected display
//! sink by [`handler::MessageHandler`].
//!
//! ```text
//! command ──► CommandRouter ──► ConnectionManager ──► WebSocket
//!                                      │
//!              MessageHandler ◄────────┘ (reader task)
//! ```
//!
//! The transport, display surface, configuration store, and player identity
//! are all trait boundaries, so the protocol core runs unchanged inside a
//! game client, the bundled `sgu` REPL binary, or a test harness.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod host;
pub mod router;
pub mod state;
pub mod transport;

pub use cli::{split_command_line, Cli, Command, CommandLine};
pub use config::{ConfigStore, EndpointConfig, FileConfigStore, MemoryConfigStore};
pub use connection::{AuthCredential, ConnectionManager};
pub use error::ClientError;
pub use handler::MessageHandler;
pub use host::{DisplaySink, HeldItem, PlayerHandle, StaticPlayer, StdoutDisplay};
pub use router::CommandRouter;
pub use state::ConnectionState;
pub use transport::{Transport, TransportEvent, WsTransport};
