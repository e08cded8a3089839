//! Canonical JSON encoding and decoding of audit events.

use custos_core::AuditEvent;
use serde::{Deserialize, Serialize};
use serde_json::de::Read;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{CodecError, DecodeError, Result};
use crate::schema::{audit_event_schema, EventSchema};

/// Layout of encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMode {
    /// Single line, for transport.
    #[default]
    Compact,
    /// Indented, for human-facing logs.
    Pretty,
}

/// Serializer configuration, embeddable in a host service's own config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializerConfig {
    /// Mode used by [`AuditEventSerializer::encode_default`].
    pub mode: EncodeMode,
}

/// Encodes audit events to JSON and decodes them back.
///
/// Absent optional fields are omitted rather than written as `null`.
/// Decoding ignores unknown fields, rejects documents missing a mandatory
/// field, and re-checks event invariants; it never fills in defaults for
/// mandatory fields. Nesting depth is not limited, so resource chains and
/// metadata of any depth decode as they were encoded.
///
/// The serializer holds only configuration and can be shared across threads.
///
/// # Examples
///
/// ```rust
/// use custos_codec::{AuditEventSerializer, EncodeMode};
/// use custos_core::{ActionCategory, ActorBuilder, AuditEventBuilder, ResourceBuilder};
///
/// let event = AuditEventBuilder::new()
///     .source("billing")
///     .action("billing.invoice.viewed")
///     .category(ActionCategory::View)
///     .actor(ActorBuilder::user("user-1").build().unwrap())
///     .resource(ResourceBuilder::new("invoice", "inv-1").build().unwrap())
///     .build()
///     .unwrap();
///
/// let serializer = AuditEventSerializer::default();
/// let json = serializer.encode(&event, EncodeMode::Compact).unwrap();
/// assert_eq!(serializer.decode(&json).unwrap(), event);
/// ```
#[derive(Debug, Clone)]
pub struct AuditEventSerializer {
    config: SerializerConfig,
    schema: EventSchema,
}

impl Default for AuditEventSerializer {
    fn default() -> Self {
        Self::new(SerializerConfig::default())
    }
}

impl AuditEventSerializer {
    /// Creates a serializer with the given configuration.
    #[must_use]
    pub fn new(config: SerializerConfig) -> Self {
        Self {
            config,
            schema: audit_event_schema(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Encodes an event in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the event cannot be rendered.
    pub fn encode(&self, event: &AuditEvent, mode: EncodeMode) -> Result<String> {
        trace!(event_id = %event.event_id(), ?mode, "encoding audit event");
        let encoded = match mode {
            EncodeMode::Compact => serde_json::to_string(event),
            EncodeMode::Pretty => serde_json::to_string_pretty(event),
        };
        encoded.map_err(CodecError::Encode)
    }

    /// Encodes an event in the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the event cannot be rendered.
    pub fn encode_default(&self, event: &AuditEvent) -> Result<String> {
        self.encode(event, self.config.mode)
    }

    /// Encodes an event as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the event cannot be rendered.
    pub fn to_pretty(&self, event: &AuditEvent) -> Result<String> {
        self.encode(event, EncodeMode::Pretty)
    }

    /// Encodes an event as compact UTF-8 bytes, e.g. for a message topic.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the event cannot be rendered.
    pub fn to_bytes(&self, event: &AuditEvent) -> Result<Vec<u8>> {
        trace!(event_id = %event.event_id(), "encoding audit event to bytes");
        serde_json::to_vec(event).map_err(CodecError::Encode)
    }

    /// Encodes an event as a JSON value tree.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the event cannot be rendered.
    pub fn to_value(&self, event: &AuditEvent) -> Result<Value> {
        serde_json::to_value(event).map_err(CodecError::Encode)
    }

    /// Decodes an event from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] for invalid JSON,
    /// [`DecodeError::Shape`] for a missing mandatory field or a mistyped
    /// value, and [`DecodeError::Invalid`] when the decoded event violates
    /// an invariant.
    pub fn decode(&self, text: &str) -> std::result::Result<AuditEvent, DecodeError> {
        self.decode_document(parse(serde_json::Deserializer::from_str(text)))
    }

    /// Decodes an event from JSON bytes.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode); invalid UTF-8 is reported as
    /// [`DecodeError::Malformed`].
    pub fn decode_bytes(&self, bytes: &[u8]) -> std::result::Result<AuditEvent, DecodeError> {
        self.decode_document(parse(serde_json::Deserializer::from_slice(bytes)))
    }

    /// Decodes an event from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode), minus the syntax errors.
    pub fn decode_value(&self, document: Value) -> std::result::Result<AuditEvent, DecodeError> {
        self.decode_document(Ok(document))
    }

    fn decode_document(
        &self,
        parsed: serde_json::Result<Value>,
    ) -> std::result::Result<AuditEvent, DecodeError> {
        let result = parsed
            .map_err(DecodeError::from)
            .and_then(|document| self.decode_checked(document));
        match &result {
            Ok(event) => trace!(event_id = %event.event_id(), "decoded audit event"),
            Err(e) => debug!(category = e.category(), error = %e, "rejected audit event document"),
        }
        result
    }

    fn decode_checked(&self, document: Value) -> std::result::Result<AuditEvent, DecodeError> {
        let unknown = self.schema.unknown_fields(&document);
        if !unknown.is_empty() {
            debug!(?unknown, "ignoring unknown audit event fields");
        }
        let checked = AuditEvent::deserialize_checked(document)?;
        checked.map_err(DecodeError::from)
    }
}

/// Parses one JSON document without serde_json's recursion limit, growing
/// the stack on demand instead.
fn parse<'de, R: Read<'de>>(
    mut deserializer: serde_json::Deserializer<R>,
) -> serde_json::Result<Value> {
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}
