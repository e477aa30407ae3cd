//! Inbound message handling.
//!
//! Every frame is rendered to the display sink; the one message type with a
//! local side effect is `auth-key`, which persists a new access key into the
//! endpoint configuration. Unknown message types are displayed generically
//! and otherwise ignored.

use std::sync::Arc;

use tracing::{debug, warn};

use sgu_proto::InboundMessage;

use crate::config::ConfigStore;
use crate::error::ClientError;
use crate::host::DisplaySink;

/// Message type that carries a freshly issued access key.
const AUTH_KEY_TYPE: &str = "auth-key";

/// Classifies inbound frames and renders them to the user.
pub struct MessageHandler {
    display: Arc<dyn DisplaySink>,
    config: Arc<dyn ConfigStore>,
}

impl MessageHandler {
    /// Create a handler over the given display sink and config store.
    #[must_use]
    pub fn new(display: Arc<dyn DisplaySink>, config: Arc<dyn ConfigStore>) -> Self {
        Self { display, config }
    }

    /// Handle a text frame, reporting rather than propagating failures.
    ///
    /// Called from the reader task; a malformed frame must never take the
    /// host down.
    pub fn on_frame(&self, text: &str) {
        if let Err(e) = self.handle_frame(text) {
            warn!(error = %e, "Discarding inbound frame");
            self.display.show(&format!("Discarded malformed message: {e}"));
        }
    }

    /// Handle a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a JSON object with a string
    /// `type`, if an `auth-key` message lacks its `uuid`, or if the new
    /// access key cannot be persisted.
    pub fn handle_frame(&self, text: &str) -> Result<(), ClientError> {
        debug!(frame = %text, "Received message");
        let message = InboundMessage::parse(text)?;

        self.display.show("New message!");
        self.display
            .show(&format!("Message type: {}", message.kind()));
        for (name, value) in message.fields() {
            self.display.show(&format!("Field {name}: {value}"));
        }

        if message.kind() == AUTH_KEY_TYPE {
            let key = message
                .field_str("uuid")
                .ok_or_else(|| ClientError::Protocol("auth-key message missing uuid".into()))?;
            self.config.set_access_key(key)?;
            self.display.show("Save this access key!");
        }
        Ok(())
    }

    /// The peer closed the connection.
    pub fn on_closed(&self, code: u16, reason: &str) {
        debug!(code, reason, "Connection closed by peer");
        self.display
            .show(&format!("Connection closed (code {code}): {reason}"));
    }

    /// The transport reported an error.
    pub fn on_error(&self, message: &str) {
        warn!(error = %message, "Transport error");
        self.display.show(&format!("Connection error: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::config::MemoryConfigStore;

    #[derive(Default)]
    struct RecordingDisplay {
        lines: Mutex<Vec<String>>,
    }

    impl DisplaySink for RecordingDisplay {
        fn show(&self, text: &str) {
            self.lines.lock().push(text.to_string());
        }
    }

    fn handler() -> (Arc<RecordingDisplay>, Arc<MemoryConfigStore>, MessageHandler) {
        let display = Arc::new(RecordingDisplay::default());
        let config = Arc::new(MemoryConfigStore::new("ws://127.0.0.1:9001"));
        let handler = MessageHandler::new(
            Arc::clone(&display) as Arc<dyn DisplaySink>,
            Arc::clone(&config) as Arc<dyn ConfigStore>,
        );
        (display, config, handler)
    }

    #[test]
    fn auth_key_persists_and_prompts() {
        let (display, config, handler) = handler();
        handler
            .handle_frame(r#"{"type":"auth-key","uuid":"abc123"}"#)
            .unwrap();

        assert_eq!(config.access_key(), Some("abc123".into()));
        let lines = display.lines.lock();
        assert_eq!(lines[0], "New message!");
        assert_eq!(lines[1], "Message type: auth-key");
        assert_eq!(lines[2], "Field uuid: \"abc123\"");
        assert_eq!(lines[3], "Save this access key!");
    }

    #[test]
    fn auth_key_overwrites_prior_key() {
        let (_display, config, handler) = handler();
        config.set_access_key("old").unwrap();
        handler
            .handle_frame(r#"{"type":"auth-key","uuid":"new"}"#)
            .unwrap();
        assert_eq!(config.access_key(), Some("new".into()));
    }

    #[test]
    fn other_types_leave_key_unchanged() {
        let (display, config, handler) = handler();
        handler
            .handle_frame(r#"{"type":"error","message":"denied"}"#)
            .unwrap();
        assert_eq!(config.access_key(), None);
        let lines = display.lines.lock();
        assert_eq!(lines[1], "Message type: error");
        assert_eq!(lines[2], "Field message: \"denied\"");
    }

    #[test]
    fn unknown_type_is_displayed_generically() {
        let (display, config, handler) = handler();
        handler
            .handle_frame(r#"{"type":"group-info","group_id":3,"owner":"alice"}"#)
            .unwrap();
        assert_eq!(config.access_key(), None);
        let lines = display.lines.lock();
        assert_eq!(
            *lines,
            vec![
                "New message!".to_string(),
                "Message type: group-info".into(),
                "Field group_id: 3".into(),
                "Field owner: \"alice\"".into(),
            ]
        );
    }

    #[test]
    fn malformed_frame_is_reported_not_propagated() {
        let (display, config, handler) = handler();
        handler.on_frame("not json");
        handler.on_frame(r#"{"uuid":"abc123"}"#);

        assert_eq!(config.access_key(), None);
        let lines = display.lines.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Discarded malformed message:"));
        assert!(lines[1].contains("type"));
    }

    #[test]
    fn auth_key_without_uuid_is_protocol_error() {
        let (_display, config, handler) = handler();
        let err = handler.handle_frame(r#"{"type":"auth-key"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert_eq!(config.access_key(), None);
    }

    #[test]
    fn close_and_error_reports() {
        let (display, _config, handler) = handler();
        handler.on_closed(1000, "closing");
        handler.on_error("reset by peer");
        let lines = display.lines.lock();
        assert_eq!(lines[0], "Connection closed (code 1000): closing");
        assert_eq!(lines[1], "Connection error: reset by peer");
    }
}
