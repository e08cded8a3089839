//! Machine-readable description of the audit event wire format.
//!
//! Field names in the wire format are a compatibility contract. The
//! descriptors here let consumers publish that contract and let the decoder
//! report fields it does not know about.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current schema version of the wire format.
pub const CURRENT_SCHEMA_VERSION: &str = custos_core::DEFAULT_SCHEMA_VERSION;

/// Schema definition for one JSON object in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchema {
    /// Schema name
    pub name: String,

    /// Schema version
    pub version: String,

    /// Schema description
    pub description: String,

    /// Fields that must be present when decoding
    pub required_fields: Vec<FieldDefinition>,

    /// Fields that may be omitted
    pub optional_fields: Vec<FieldDefinition>,
}

/// Field definition within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Wire name of the field
    pub name: String,

    /// Field type
    pub field_type: FieldType,

    /// Field description
    pub description: String,

    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String field
    String,
    /// Non-negative integer field
    Integer,
    /// Boolean field
    Boolean,
    /// RFC 3339 timestamp with offset
    Timestamp,
    /// UUID string
    Uuid,
    /// One of a fixed set of upper-case names
    Enum,
    /// Array field
    Array,
    /// Object field
    Object,
    /// Any JSON value
    Any,
}

impl EventSchema {
    /// Creates a new event schema.
    #[must_use]
    pub fn new(name: &str, version: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            required_fields: Vec::new(),
            optional_fields: Vec::new(),
        }
    }

    /// Adds a required field.
    #[must_use]
    pub fn required(mut self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.required_fields
            .push(FieldDefinition::new(name, field_type, description));
        self
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional(mut self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.optional_fields
            .push(FieldDefinition::new(name, field_type, description));
        self
    }

    /// Returns true if `name` is declared, required or optional.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.required_fields
            .iter()
            .chain(&self.optional_fields)
            .any(|f| f.name == name)
    }

    /// Names of required fields absent from `document`.
    ///
    /// A non-object document is missing every required field.
    #[must_use]
    pub fn missing_required<'a>(&'a self, document: &Value) -> Vec<&'a str> {
        let object = document.as_object();
        self.required_fields
            .iter()
            .filter(|f| object.map_or(true, |o| !o.contains_key(&f.name)))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Names of top-level keys in `document` that this schema does not declare.
    #[must_use]
    pub fn unknown_fields(&self, document: &Value) -> Vec<String> {
        document
            .as_object()
            .map(|o| {
                o.keys()
                    .filter(|k| !self.declares(k))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FieldDefinition {
    /// Creates a new field definition.
    #[must_use]
    pub fn new(name: &str, field_type: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: description.to_string(),
            example: None,
        }
    }

    /// Sets an example value.
    #[must_use]
    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }
}

/// Returns the schema for the top-level audit event object.
#[must_use]
pub fn audit_event_schema() -> EventSchema {
    EventSchema::new(
        "AuditEvent",
        CURRENT_SCHEMA_VERSION,
        "Who did what to what, with what result",
    )
    .required("eventId", FieldType::Uuid, "Unique event identifier")
    .required("timestamp", FieldType::Timestamp, "When the event occurred")
    .required("source", FieldType::String, "Emitting service or module")
    .required("actor", FieldType::Object, "Subject performing the action")
    .required("action", FieldType::String, "Action in domain.entity.verb form")
    .required("category", FieldType::Enum, "Action category")
    .required("resource", FieldType::Object, "Target resource")
    .optional("version", FieldType::String, "Schema version, 1.0 when absent")
    .optional("correlationId", FieldType::String, "Links related events")
    .optional("changes", FieldType::Array, "Field-level changes, in order")
    .optional("outcome", FieldType::Object, "Result of the action")
    .optional("metadata", FieldType::Object, "Free-form metadata")
    .optional("tags", FieldType::Array, "Unordered, deduplicated tags")
}

/// Returns the schema for the `actor` object.
#[must_use]
pub fn actor_schema() -> EventSchema {
    EventSchema::new("Actor", CURRENT_SCHEMA_VERSION, "Subject performing the action")
        .required("actorType", FieldType::Enum, "Kind of actor")
        .optional("userId", FieldType::String, "User, account or service id")
        .optional("sessionId", FieldType::String, "Session id")
        .optional("roles", FieldType::Array, "Roles held at the time")
        .optional("ipAddress", FieldType::String, "Client IP address")
        .optional("userAgent", FieldType::String, "Client user agent")
        .optional("onBehalfOf", FieldType::Object, "Delegating user")
        .optional("attributes", FieldType::Object, "Free-form attributes")
}

/// Returns the schema for `resource` objects, including nested parents.
#[must_use]
pub fn resource_schema() -> EventSchema {
    EventSchema::new("Resource", CURRENT_SCHEMA_VERSION, "Entity acted upon")
        .required("type", FieldType::String, "Resource type")
        .required("id", FieldType::String, "Resource identifier")
        .optional("displayName", FieldType::String, "Human-readable name")
        .optional("parentResource", FieldType::Object, "Enclosing resource")
        .optional("attributes", FieldType::Object, "Free-form attributes")
}

/// Returns the schema for entries of the `changes` array.
#[must_use]
pub fn change_schema() -> EventSchema {
    EventSchema::new("Change", CURRENT_SCHEMA_VERSION, "Field-level delta")
        .required("field", FieldType::String, "Dot-notation field path")
        .optional("oldValue", FieldType::Any, "Value before, absent if new")
        .optional("newValue", FieldType::Any, "Value after, absent if removed")
        .optional("changeType", FieldType::Enum, "Inferred when absent")
}

/// Returns the schema for the `outcome` object.
#[must_use]
pub fn outcome_schema() -> EventSchema {
    EventSchema::new("Outcome", CURRENT_SCHEMA_VERSION, "Result of the action")
        .required("success", FieldType::Boolean, "Whether the action succeeded")
        .optional("errorCode", FieldType::String, "Error code on failure")
        .optional("errorMessage", FieldType::String, "Error message")
        .optional("durationMs", FieldType::Integer, "Duration in milliseconds")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_event_schema() {
        let schema = audit_event_schema();

        assert_eq!(schema.name, "AuditEvent");
        assert_eq!(schema.version, "1.0");
        assert_eq!(schema.required_fields.len(), 7);
        assert!(schema.required_fields.iter().any(|f| f.name == "resource"));
        assert!(schema.optional_fields.iter().any(|f| f.name == "version"));
    }

    #[test]
    fn test_missing_required() {
        let schema = outcome_schema();
        assert!(schema.missing_required(&json!({"success": true})).is_empty());
        assert_eq!(schema.missing_required(&json!({})), vec!["success"]);
        assert_eq!(schema.missing_required(&json!([1, 2])), vec!["success"]);
    }

    #[test]
    fn test_unknown_fields() {
        let schema = resource_schema();
        let doc = json!({"type": "order", "id": "1", "legacyId": 7});
        assert_eq!(schema.unknown_fields(&doc), vec!["legacyId".to_string()]);
        assert!(schema.unknown_fields(&json!("scalar")).is_empty());
    }

    #[test]
    fn test_field_definition() {
        let field = FieldDefinition::new("category", FieldType::Enum, "Action category")
            .with_example("PERMISSION_CHANGE");

        assert_eq!(field.field_type, FieldType::Enum);
        assert_eq!(field.example, Some("PERMISSION_CHANGE".to_string()));
    }

    #[test]
    fn test_schema_serialization() {
        let json = serde_json::to_value(change_schema()).unwrap();
        assert_eq!(json["name"], "Change");
        assert_eq!(json["requiredFields"][0]["fieldType"], "string");

        let back: EventSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, change_schema());
    }

    #[test]
    fn test_nested_schemas_declare_wire_names() {
        assert!(actor_schema().declares("onBehalfOf"));
        assert!(resource_schema().declares("parentResource"));
        assert!(!resource_schema().declares("parent_resource"));
    }
}
