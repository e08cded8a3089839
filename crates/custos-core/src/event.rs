//! The audit event aggregate.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::actor::ActorRecord;
use crate::change::ChangeRecord;
use crate::resource::ResourceRecord;
use crate::validation::{require_non_empty, Validate, ValidationErrors};
use crate::{Actor, Attributes, Change, Outcome, Resource};

/// Schema version stamped on events that do not specify one.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Tags that mark an event as security-critical regardless of category.
const SECURITY_TAGS: [&str; 2] = ["security", "critical"];

/// Generates a new random event identifier.
pub(crate) fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn default_version() -> String {
    DEFAULT_SCHEMA_VERSION.to_string()
}

/// Category of an action, used for aggregation and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCategory {
    /// Something was created.
    Create,
    /// Something was updated.
    Update,
    /// Something was deleted.
    Delete,
    /// Something was read or viewed.
    View,
    /// Data was exported.
    Export,
    /// Data was imported.
    Import,
    /// A session was opened.
    Login,
    /// A session was closed.
    Logout,
    /// Access rights were changed.
    PermissionChange,
    /// System configuration was changed.
    ConfigurationChange,
    /// An operation or job was executed.
    Execute,
    /// A file was downloaded.
    Download,
    /// A file was uploaded.
    Upload,
    /// Something was shared.
    Share,
    /// Something was archived.
    Archive,
    /// Something was restored.
    Restore,
}

impl ActionCategory {
    /// Returns the wire spelling of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::View => "VIEW",
            Self::Export => "EXPORT",
            Self::Import => "IMPORT",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::PermissionChange => "PERMISSION_CHANGE",
            Self::ConfigurationChange => "CONFIGURATION_CHANGE",
            Self::Execute => "EXECUTE",
            Self::Download => "DOWNLOAD",
            Self::Upload => "UPLOAD",
            Self::Share => "SHARE",
            Self::Archive => "ARCHIVE",
            Self::Restore => "RESTORE",
        }
    }

    /// Categories that are security-critical on their own.
    #[must_use]
    pub const fn is_security_sensitive(self) -> bool {
        matches!(
            self,
            Self::PermissionChange | Self::Login | Self::Logout | Self::Delete
        )
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete audit record: who did what to what, with what result.
///
/// Events are produced by [`AuditEventBuilder`](crate::AuditEventBuilder) or
/// by decoding a wire document, and are never mutated afterwards. They are
/// `Send + Sync` and can be shared freely across threads.
///
/// Deserializing runs [`Validate`], so a document that no builder could
/// have produced is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AuditEventRecord")]
pub struct AuditEvent {
    pub(crate) event_id: String,

    pub(crate) version: String,

    pub(crate) timestamp: DateTime<Utc>,

    pub(crate) source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correlation_id: Option<String>,

    pub(crate) actor: Actor,

    pub(crate) action: String,

    pub(crate) category: ActionCategory,

    pub(crate) resource: Resource,

    pub(crate) changes: Vec<Change>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) outcome: Option<Outcome>,

    pub(crate) metadata: Attributes,

    pub(crate) tags: BTreeSet<String>,
}

/// Wire form of an event, before validation. Nested records are unchecked
/// too, so every violation is reported once with its full field path.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditEventRecord {
    event_id: String,
    #[serde(default = "default_version")]
    version: String,
    timestamp: DateTime<Utc>,
    source: String,
    #[serde(default)]
    correlation_id: Option<String>,
    actor: ActorRecord,
    action: String,
    category: ActionCategory,
    resource: ResourceRecord,
    #[serde(default)]
    changes: Vec<ChangeRecord>,
    #[serde(default)]
    outcome: Option<Outcome>,
    #[serde(default)]
    metadata: Attributes,
    #[serde(default)]
    tags: BTreeSet<String>,
}

impl TryFrom<AuditEventRecord> for AuditEvent {
    type Error = ValidationErrors;

    fn try_from(record: AuditEventRecord) -> Result<Self, Self::Error> {
        let event = Self {
            event_id: record.event_id,
            version: record.version,
            timestamp: record.timestamp,
            source: record.source,
            correlation_id: record.correlation_id,
            actor: record.actor.into_unchecked(),
            action: record.action,
            category: record.category,
            resource: record.resource.into_unchecked(),
            changes: record
                .changes
                .into_iter()
                .map(ChangeRecord::into_unchecked)
                .collect(),
            outcome: record.outcome,
            metadata: record.metadata,
            tags: record.tags,
        };
        event.validate()?;
        Ok(event)
    }
}

impl AuditEvent {
    /// Deserializes an event, keeping shape errors apart from invariant
    /// violations.
    ///
    /// The outer result carries the deserializer's own error: malformed
    /// input, a missing mandatory field or a mistyped value. The inner
    /// result carries the outcome of [`Validate`]. The plain
    /// [`Deserialize`] impl folds both into the deserializer's error.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error when the input does not have the
    /// audit event shape.
    pub fn deserialize_checked<'de, D>(
        deserializer: D,
    ) -> Result<Result<Self, ValidationErrors>, D::Error>
    where
        D: Deserializer<'de>,
    {
        AuditEventRecord::deserialize(deserializer).map(Self::try_from)
    }

    /// Unique event identifier, usable for idempotent delivery.
    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Schema version of this event.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// When the event occurred (UTC).
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Emitting service or module.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifier linking related events into one logical transaction.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Who performed the action.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The action, by convention `domain.entity.verb`.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Category of the action.
    #[must_use]
    pub const fn category(&self) -> ActionCategory {
        self.category
    }

    /// What the action was performed on.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Field-level changes, in the order they were recorded.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Result of the action, if recorded.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Free-form event metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Attributes {
        &self.metadata
    }

    /// Tags for filtering and grouping.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns true if the event carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the event is relevant to security review.
    ///
    /// True for permission changes, logins, logouts and deletions, and for
    /// any event tagged `security` or `critical`.
    #[must_use]
    pub fn is_security_critical(&self) -> bool {
        self.category.is_security_sensitive() || SECURITY_TAGS.iter().any(|t| self.has_tag(t))
    }

    /// Whether the action succeeded. An event without an outcome counts as
    /// successful.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().map_or(true, Outcome::is_success)
    }

    /// One-line human-readable description of the event.
    ///
    /// # Examples
    ///
    /// ```
    /// use custos_core::{ActionCategory, ActorBuilder, AuditEventBuilder, ResourceBuilder};
    ///
    /// let event = AuditEventBuilder::new()
    ///     .source("order-service")
    ///     .action("sales.order.updated")
    ///     .category(ActionCategory::Update)
    ///     .actor(ActorBuilder::user("user-123").build().unwrap())
    ///     .resource(ResourceBuilder::new("order", "ord-1001").build().unwrap())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     event.summary(),
    ///     "user-123 successfully performed 'sales.order.updated' on order:ord-1001",
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let result = if self.succeeded() {
            "successfully performed"
        } else {
            "failed to perform"
        };
        format!(
            "{} {result} '{}' on {}",
            self.actor.display_identity(),
            self.action,
            self.resource.segment()
        )
    }
}

impl Validate for AuditEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_non_empty(&mut errors, "eventId", &self.event_id);
        require_non_empty(&mut errors, "version", &self.version);
        require_non_empty(&mut errors, "source", &self.source);
        require_non_empty(&mut errors, "action", &self.action);
        if let Err(nested) = self.actor.validate() {
            errors.merge_nested("actor", nested);
        }
        if let Err(nested) = self.resource.validate() {
            errors.merge_nested("resource", nested);
        }
        for (index, change) in self.changes.iter().enumerate() {
            if let Err(nested) = change.validate() {
                errors.merge_nested(&format!("changes[{index}]"), nested);
            }
        }
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorBuilder, AuditEventBuilder, OutcomeBuilder, ResourceBuilder};

    fn event_with(category: ActionCategory, tags: &[&str]) -> AuditEvent {
        AuditEventBuilder::new()
            .source("test-service")
            .action("test.entity.verb")
            .category(category)
            .actor(ActorBuilder::user("user-1").build().unwrap())
            .resource(ResourceBuilder::new("document", "doc-1").build().unwrap())
            .tags(tags.iter().copied())
            .build()
            .unwrap()
    }

    #[test]
    fn test_security_critical_by_category() {
        assert!(event_with(ActionCategory::Login, &[]).is_security_critical());
        assert!(event_with(ActionCategory::Logout, &[]).is_security_critical());
        assert!(event_with(ActionCategory::Delete, &[]).is_security_critical());
        assert!(event_with(ActionCategory::PermissionChange, &[]).is_security_critical());
    }

    #[test]
    fn test_security_critical_by_tag() {
        assert!(!event_with(ActionCategory::View, &[]).is_security_critical());
        assert!(!event_with(ActionCategory::View, &["access"]).is_security_critical());
        assert!(event_with(ActionCategory::View, &["critical"]).is_security_critical());
        assert!(event_with(ActionCategory::Export, &["security"]).is_security_critical());
    }

    #[test]
    fn test_summary_for_failure_and_system_actor() {
        let event = AuditEventBuilder::new()
            .source("scheduler")
            .action("billing.invoice.generated")
            .category(ActionCategory::Execute)
            .actor(ActorBuilder::system().build().unwrap())
            .resource(ResourceBuilder::new("invoice", "inv-7").build().unwrap())
            .outcome(OutcomeBuilder::failure("TIMEOUT", "took too long").build())
            .build()
            .unwrap();

        assert_eq!(
            event.summary(),
            "SYSTEM failed to perform 'billing.invoice.generated' on invoice:inv-7"
        );
    }

    #[test]
    fn test_summary_treats_missing_outcome_as_success() {
        let event = event_with(ActionCategory::View, &[]);
        assert!(event.outcome().is_none());
        assert!(event.summary().contains("successfully performed"));
    }

    #[test]
    fn test_category_display_matches_wire() {
        assert_eq!(ActionCategory::ConfigurationChange.to_string(), "CONFIGURATION_CHANGE");
        assert_eq!(
            serde_json::to_value(ActionCategory::PermissionChange).unwrap(),
            "PERMISSION_CHANGE"
        );
    }

    #[test]
    fn test_validate_built_event() {
        assert!(event_with(ActionCategory::Create, &[]).is_valid());
    }

    #[test]
    fn test_validate_reports_nested_change_field() {
        let mut event = event_with(ActionCategory::Update, &[]);
        event.changes.push(Change::resolved(String::new(), None, None, None));

        let errors = event.validate().unwrap_err();
        assert_eq!(errors.first().unwrap().field, "changes[0].field");
    }

    #[test]
    fn test_deserialize_rejects_empty_resource_id() {
        let mut document = serde_json::to_value(event_with(ActionCategory::View, &[])).unwrap();
        document["resource"]["id"] = serde_json::json!("");

        let err = serde_json::from_value::<AuditEvent>(document).unwrap_err();
        assert!(err.to_string().contains("resource.id"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_empty_source() {
        let mut document = serde_json::to_value(event_with(ActionCategory::View, &[])).unwrap();
        document["source"] = serde_json::json!("");

        assert!(serde_json::from_value::<AuditEvent>(document).is_err());
    }

    #[test]
    fn test_deserialize_checked_separates_shape_from_validation() {
        let original = event_with(ActionCategory::Update, &["x"]);
        let document = serde_json::to_value(&original).unwrap();
        let decoded = AuditEvent::deserialize_checked(document.clone()).unwrap().unwrap();
        assert_eq!(decoded, original);

        let mut invalid = document.clone();
        invalid["resource"]["type"] = serde_json::json!("");
        invalid["actor"]["onBehalfOf"] = serde_json::json!({"userId": ""});
        let errors = AuditEvent::deserialize_checked(invalid).unwrap().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["actor.onBehalfOf.userId", "resource.type"]);

        let mut missing = document;
        missing.as_object_mut().unwrap().remove("actor");
        assert!(AuditEvent::deserialize_checked(missing).is_err());
    }
}
