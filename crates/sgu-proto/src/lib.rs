//! # sgu-proto
//!
//! Wire protocol for the SGU remote inventory/project service.
//!
//! Every frame on the wire is a UTF-8 JSON object with a `type` field that
//! discriminates the message. Outbound requests are assembled with
//! [`RequestBuilder`]; inbound frames are parsed into [`InboundMessage`].
//!
//! ```text
//! ┌────────────┐   Request (JSON text)    ┌─────────────┐
//! │ sgu-client │─────────────────────────►│ SGU service │
//! │            │◄─────────────────────────│             │
//! └────────────┘   InboundMessage         └─────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod inbound;
pub mod request;

pub use error::ProtoError;
pub use inbound::InboundMessage;
pub use request::{FieldValue, Request, RequestBuilder};
