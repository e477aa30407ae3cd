//! Outbound request construction.
//!
//! Every command the client exposes maps to exactly one request kind. The
//! remote service dispatches on the `type` field, so `type` is always
//! serialized first; remaining fields follow in the order they were added.
//! Field order carries no meaning on the wire but keeps serialization
//! deterministic.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ProtoError;

/// A request field value — the protocol only carries strings and integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// String field.
    Str(String),
    /// Integer field.
    Int(i64),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// An immutable outbound request: a kind plus ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    kind: String,
    fields: Vec<(String, FieldValue)>,
}

impl Request {
    /// The request kind (the wire `type` discriminator).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The fields in serialization order, excluding `type`.
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Serialize to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.fields.len()))?;
        map.serialize_entry("type", &self.kind)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builder for [`Request`].
///
/// Pure and stateless: the same kind and field sequence always produce a
/// structurally identical request. No validation is performed on field names
/// or values; the caller owns the protocol table.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    kind: String,
    fields: Vec<(String, FieldValue)>,
}

impl RequestBuilder {
    /// Start a request of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Append a string field.
    #[must_use]
    pub fn field_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FieldValue::Str(value.into())));
        self
    }

    /// Append an integer field.
    #[must_use]
    pub fn field_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.push((name.into(), FieldValue::Int(value)));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            kind: self.kind,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_serialized_first() {
        let req = RequestBuilder::new("group-create")
            .field_str("group_name", "builders")
            .build();
        let json = req.to_json().unwrap();
        assert_eq!(json, r#"{"type":"group-create","group_name":"builders"}"#);
    }

    #[test]
    fn test_field_order_preserved() {
        let req = RequestBuilder::new("item-add")
            .field_str("external_id", "chest1")
            .field_str("item_id", "stick")
            .field_int("item_qty", 5)
            .build();
        let json = req.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"item-add","external_id":"chest1","item_id":"stick","item_qty":5}"#
        );
    }

    #[test]
    fn test_no_fields() {
        let req = RequestBuilder::new("group-list").build();
        assert_eq!(req.to_json().unwrap(), r#"{"type":"group-list"}"#);
    }

    #[test]
    fn test_builder_is_pure() {
        let build = || {
            RequestBuilder::new("project-scope")
                .field_int("project_id", 7)
                .field_int("group_id", -1)
                .field_str("scope", "PUBLIC")
                .build()
        };
        let a = build();
        let b = build();
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_negative_sentinel_serializes() {
        let req = RequestBuilder::new("project-item-reserve")
            .field_int("source_project_id", -1)
            .build();
        assert!(req.to_json().unwrap().contains("\"source_project_id\":-1"));
    }

    #[test]
    fn test_accessors() {
        let req = RequestBuilder::new("item-get")
            .field_str("external_id", "barrel")
            .build();
        assert_eq!(req.kind(), "item-get");
        assert_eq!(req.fields().len(), 1);
        assert_eq!(req.fields()[0].1, FieldValue::Str("barrel".into()));
    }
}
