//! # Custos Codec
//!
//! Canonical JSON wire format for [`custos_core::AuditEvent`].
//!
//! The wire format uses camelCase field names, upper-case enumeration names,
//! RFC 3339 timestamps and nested `parentResource` objects. Absent optional
//! fields are omitted. Field names are a compatibility contract with external
//! consumers; [`schema`] describes them.
//!
//! ## Example
//!
//! ```rust
//! use custos_codec::{AuditEventSerializer, DecodeError};
//!
//! let serializer = AuditEventSerializer::default();
//! let err = serializer.decode(r#"{"eventId":"e-1"}"#).unwrap_err();
//! assert!(matches!(err, DecodeError::Shape(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod schema;
pub mod serializer;

pub use error::{CodecError, DecodeError, Result};
pub use schema::{
    actor_schema, audit_event_schema, change_schema, outcome_schema, resource_schema, EventSchema,
    FieldDefinition, FieldType, CURRENT_SCHEMA_VERSION,
};
pub use serializer::{AuditEventSerializer, EncodeMode, SerializerConfig};
