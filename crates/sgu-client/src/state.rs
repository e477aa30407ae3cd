//! Connection state types.

use std::sync::atomic::{AtomicU32, Ordering};

/// State of the logical service connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Dial in progress.
    Connecting,
    /// Connected and handshake sent.
    Open,
    /// Graceful close requested, awaiting confirmation.
    Closing,
}

/// Atomic wrapper for connection state, shared with the reader task.
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU32);

impl AtomicConnectionState {
    /// Create a new atomic state.
    #[must_use]
    pub const fn new(state: ConnectionState) -> Self {
        Self(AtomicU32::new(state as u32))
    }

    /// Load the current state.
    #[must_use]
    pub fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::SeqCst) {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Store a new state.
    pub fn store(&self, state: ConnectionState) {
        self.0.store(state as u32, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_enum() {
        assert_eq!(ConnectionState::Disconnected as u32, 0);
        assert_eq!(ConnectionState::Connecting as u32, 1);
        assert_eq!(ConnectionState::Open as u32, 2);
        assert_eq!(ConnectionState::Closing as u32, 3);
    }

    #[test]
    fn test_atomic_connection_state() {
        let state = AtomicConnectionState::new(ConnectionState::Disconnected);
        assert_eq!(state.load(), ConnectionState::Disconnected);

        state.store(ConnectionState::Connecting);
        assert_eq!(state.load(), ConnectionState::Connecting);

        state.store(ConnectionState::Open);
        assert_eq!(state.load(), ConnectionState::Open);

        state.store(ConnectionState::Closing);
        assert_eq!(state.load(), ConnectionState::Closing);
    }
}
