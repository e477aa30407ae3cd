//! Client error types.

use std::fmt;

use sgu_proto::ProtoError;

/// Client-side errors.
#[derive(Debug)]
pub enum ClientError {
    /// Connecting, sending, or the transport dropping mid-session.
    Connection(String),
    /// Invalid configuration (bad address, unreadable config file).
    Config(String),
    /// Malformed inbound frame or a message violating the protocol.
    Protocol(String),
    /// Invalid command argument.
    InvalidArgument(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection error: {msg}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProtoError> for ClientError {
    fn from(err: ProtoError) -> Self {
        Self::Protocol(err.to_string())
    }
}
