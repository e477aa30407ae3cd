//! Inbound message parsing.
//!
//! The service sends JSON text frames shaped like `{"type": ..., ...}`. The
//! client routes on `type` only; every other field is opaque JSON surfaced
//! to the user. Messages are parsed per frame, consumed synchronously, and
//! never retained.

use serde_json::{Map, Value};

use crate::ProtoError;

/// A parsed inbound frame: a kind plus the remaining fields in wire order.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    kind: String,
    fields: Map<String, Value>,
}

impl InboundMessage {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a JSON object or its `type`
    /// field is missing or not a string.
    pub fn parse(text: &str) -> Result<Self, ProtoError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtoError::Decoding(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(ProtoError::Decoding("frame is not a JSON object".into()));
        };
        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtoError::MissingField("type"))?
            .to_string();
        Ok(Self { kind, fields })
    }

    /// The message kind (the wire `type` discriminator).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// All fields except `type`, in wire order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| key.as_str() != "type")
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Look up a string field by name.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_key() {
        let msg = InboundMessage::parse(r#"{"type":"auth-key","uuid":"abc123"}"#).unwrap();
        assert_eq!(msg.kind(), "auth-key");
        assert_eq!(msg.field_str("uuid"), Some("abc123"));
    }

    #[test]
    fn test_fields_skip_type_and_keep_wire_order() {
        let msg = InboundMessage::parse(
            r#"{"type":"group-info","group_id":3,"owner":"alice","members":["bob"]}"#,
        )
        .unwrap();
        let names: Vec<&str> = msg.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["group_id", "owner", "members"]);
    }

    #[test]
    fn test_type_position_does_not_matter() {
        let msg = InboundMessage::parse(r#"{"message":"nope","type":"error"}"#).unwrap();
        assert_eq!(msg.kind(), "error");
        assert_eq!(msg.fields().count(), 1);
    }

    #[test]
    fn test_rejects_non_json() {
        let err = InboundMessage::parse("not json at all").unwrap_err();
        assert!(matches!(err, ProtoError::Decoding(_)));
    }

    #[test]
    fn test_rejects_non_object() {
        let err = InboundMessage::parse(r#"["type","auth-key"]"#).unwrap_err();
        assert!(matches!(err, ProtoError::Decoding(_)));
    }

    #[test]
    fn test_rejects_missing_type() {
        let err = InboundMessage::parse(r#"{"uuid":"abc123"}"#).unwrap_err();
        assert!(matches!(err, ProtoError::MissingField("type")));
    }

    #[test]
    fn test_rejects_non_string_type() {
        let err = InboundMessage::parse(r#"{"type":42}"#).unwrap_err();
        assert!(matches!(err, ProtoError::MissingField("type")));
    }

    #[test]
    fn test_field_str_on_non_string() {
        let msg = InboundMessage::parse(r#"{"type":"auth-key","uuid":7}"#).unwrap();
        assert_eq!(msg.field_str("uuid"), None);
    }
}
