//! Validated builders for audit events and their parts.
//!
//! [`AuditEventBuilder::build`] is the only way to produce an [`AuditEvent`]
//! from field values. It checks the mandatory fields in a fixed order
//! (`source`, `action`, `category`, `actor`, `resource`) and reports the first
//! one that is missing, so the same input always yields the same error.
//!
//! # Examples
//!
//! ```rust
//! use custos_core::{
//!     ActionCategory, ActorBuilder, AuditEventBuilder, ChangeBuilder, OutcomeBuilder,
//!     ResourceBuilder,
//! };
//!
//! let event = AuditEventBuilder::new()
//!     .source("order-service")
//!     .action("sales.order.updated")
//!     .category(ActionCategory::Update)
//!     .actor(
//!         ActorBuilder::user("user-123")
//!             .session_id("sess-xyz")
//!             .roles(["manager", "sales"])
//!             .ip_address("192.168.1.10")
//!             .build()?,
//!     )
//!     .resource(
//!         ResourceBuilder::new("order", "ord-1001")
//!             .display_name("Order #1001")
//!             .parent(ResourceBuilder::new("customer", "cust-500").build()?)
//!             .build()?,
//!     )
//!     .add_change(ChangeBuilder::new("status").from("pending").to("confirmed").build()?)
//!     .outcome(OutcomeBuilder::success().duration_ms(150).build())
//!     .build()?;
//!
//! assert_eq!(event.resource().full_path(), "customer:cust-500/order:ord-1001");
//! # Ok::<(), custos_core::ValidationError>(())
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::change::present;
use crate::event::{default_version, new_event_id};
use crate::{
    ActionCategory, Actor, ActorType, Attributes, AuditEvent, Change, ChangeType, OnBehalfOf,
    Outcome, Resource, ValidationError, Value,
};

/// Takes a mandatory string, distinguishing "never set" from "set but empty".
fn required_text(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        None => Err(ValidationError::required(field)),
        Some(v) if v.is_empty() => Err(ValidationError::empty(field)),
        Some(v) => Ok(v),
    }
}

/// Accumulates the fields of an [`AuditEvent`] and validates them on `build`.
///
/// A builder is single-use construction state; it is consumed by `build`.
#[derive(Debug, Clone, Default)]
pub struct AuditEventBuilder {
    event_id: Option<String>,
    version: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    source: Option<String>,
    correlation_id: Option<String>,
    action: Option<String>,
    category: Option<ActionCategory>,
    actor: Option<Actor>,
    resource: Option<Resource>,
    changes: Vec<Change>,
    outcome: Option<Outcome>,
    metadata: Attributes,
    tags: BTreeSet<String>,
}

impl AuditEventBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event id. Defaults to a freshly generated UUID.
    #[must_use]
    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Sets the schema version. Defaults to [`DEFAULT_SCHEMA_VERSION`](crate::DEFAULT_SCHEMA_VERSION).
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the event time. Defaults to the time `build` is called.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the emitting service or module (mandatory).
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the action, e.g. `sales.order.updated` (mandatory).
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the action category (mandatory).
    #[must_use]
    pub const fn category(mut self, category: ActionCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the actor (mandatory).
    #[must_use]
    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets the target resource (mandatory).
    #[must_use]
    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Appends a change.
    #[must_use]
    pub fn add_change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    /// Appends several changes, preserving their order.
    #[must_use]
    pub fn changes(mut self, changes: impl IntoIterator<Item = Change>) -> Self {
        self.changes.extend(changes);
        self
    }

    /// Sets the outcome.
    #[must_use]
    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Adds a metadata entry, replacing any previous value for `key`.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Adds a tag. Duplicates collapse.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds several tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Validates the accumulated fields and produces the event.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first mandatory field that is
    /// missing or empty, checked in the order `source`, `action`, `category`,
    /// `actor`, `resource`. An explicitly supplied but empty `eventId` or
    /// `version` is rejected after that.
    pub fn build(self) -> Result<AuditEvent, ValidationError> {
        self.assemble().inspect_err(|e| {
            debug!(field = %e.field, kind = %e.kind, "rejected audit event");
        })
    }

    fn assemble(self) -> Result<AuditEvent, ValidationError> {
        let source = required_text("source", self.source)?;
        let action = required_text("action", self.action)?;
        let category = self
            .category
            .ok_or_else(|| ValidationError::required("category"))?;
        let actor = self.actor.ok_or_else(|| ValidationError::required("actor"))?;
        let resource = self
            .resource
            .ok_or_else(|| ValidationError::required("resource"))?;
        let event_id = match self.event_id {
            Some(id) => required_text("eventId", Some(id))?,
            None => new_event_id(),
        };
        let version = match self.version {
            Some(version) => required_text("version", Some(version))?,
            None => default_version(),
        };

        Ok(AuditEvent {
            event_id,
            version,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            source,
            correlation_id: self.correlation_id,
            actor,
            action,
            category,
            resource,
            changes: self.changes,
            outcome: self.outcome,
            metadata: self.metadata,
            tags: self.tags,
        })
    }
}

/// Builder for [`Actor`].
#[derive(Debug, Clone)]
pub struct ActorBuilder {
    actor_type: ActorType,
    user_id: Option<String>,
    session_id: Option<String>,
    roles: Vec<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    on_behalf_of: Option<OnBehalfOf>,
    attributes: Attributes,
}

impl ActorBuilder {
    /// Creates a builder for an actor of the given type.
    #[must_use]
    pub const fn new(actor_type: ActorType) -> Self {
        Self {
            actor_type,
            user_id: None,
            session_id: None,
            roles: Vec::new(),
            ip_address: None,
            user_agent: None,
            on_behalf_of: None,
            attributes: Attributes::new(),
        }
    }

    /// A human user.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::new(ActorType::User).user_id(user_id)
    }

    /// An internal system process.
    #[must_use]
    pub const fn system() -> Self {
        Self::new(ActorType::System)
    }

    /// A scheduled job.
    #[must_use]
    pub const fn scheduler() -> Self {
        Self::new(ActorType::Scheduler)
    }

    /// A service account or API token, identified by `account_id`.
    #[must_use]
    pub fn service_account(account_id: impl Into<String>) -> Self {
        Self::new(ActorType::ServiceAccount).user_id(account_id)
    }

    /// An external integration, identified by `service_id`.
    #[must_use]
    pub fn external_service(service_id: impl Into<String>) -> Self {
        Self::new(ActorType::ExternalService).user_id(service_id)
    }

    /// Sets the user id.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the session id.
    #[must_use]
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Appends a role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Appends several roles in order.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Sets the client IP address.
    #[must_use]
    pub fn ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Sets the client user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Records that the actor acted on behalf of `user_id`.
    #[must_use]
    pub fn on_behalf_of(self, user_id: impl Into<String>) -> Self {
        self.on_behalf_of_with(user_id, None::<String>, None::<String>)
    }

    /// Records a delegation with optional display name and reason.
    #[must_use]
    pub fn on_behalf_of_with(
        mut self,
        user_id: impl Into<String>,
        user_name: Option<impl Into<String>>,
        reason: Option<impl Into<String>>,
    ) -> Self {
        self.on_behalf_of = Some(OnBehalfOf {
            user_id: user_id.into(),
            user_name: user_name.map(Into::into),
            reason: reason.map(Into::into),
        });
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builds the actor.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a delegation was recorded with an
    /// empty user id.
    pub fn build(self) -> Result<Actor, ValidationError> {
        if let Some(delegation) = &self.on_behalf_of {
            if delegation.user_id.is_empty() {
                return Err(ValidationError::empty("actor.onBehalfOf.userId"));
            }
        }
        Ok(Actor {
            actor_type: self.actor_type,
            user_id: self.user_id,
            session_id: self.session_id,
            roles: self.roles,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            on_behalf_of: self.on_behalf_of,
            attributes: self.attributes,
        })
    }
}

impl From<&Actor> for ActorBuilder {
    /// Starts a builder pre-filled from an existing actor.
    fn from(actor: &Actor) -> Self {
        Self {
            actor_type: actor.actor_type,
            user_id: actor.user_id.clone(),
            session_id: actor.session_id.clone(),
            roles: actor.roles.clone(),
            ip_address: actor.ip_address.clone(),
            user_agent: actor.user_agent.clone(),
            on_behalf_of: actor.on_behalf_of.clone(),
            attributes: actor.attributes.clone(),
        }
    }
}

/// Builder for [`Resource`].
#[derive(Debug, Clone)]
pub struct ResourceBuilder {
    resource_type: String,
    id: String,
    display_name: Option<String>,
    parent: Option<Box<Resource>>,
    attributes: Attributes,
}

impl ResourceBuilder {
    /// Creates a builder for a resource of `resource_type` identified by `id`.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            display_name: None,
            parent: None,
            attributes: Attributes::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Nests this resource under `parent`, which it takes ownership of.
    #[must_use]
    pub fn parent(mut self, parent: Resource) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builds the resource.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the type or id is empty (type is
    /// checked first).
    pub fn build(self) -> Result<Resource, ValidationError> {
        if self.resource_type.is_empty() {
            return Err(ValidationError::empty("resource.type"));
        }
        if self.id.is_empty() {
            return Err(ValidationError::empty("resource.id"));
        }
        Ok(Resource {
            resource_type: self.resource_type,
            id: self.id,
            display_name: self.display_name,
            parent_resource: self.parent,
            attributes: self.attributes,
        })
    }
}

/// Builder for [`Change`].
#[derive(Debug, Clone)]
pub struct ChangeBuilder {
    field: String,
    old_value: Option<Value>,
    new_value: Option<Value>,
    change_type: Option<ChangeType>,
}

impl ChangeBuilder {
    /// Creates a builder for a change to `field` (dot notation allowed).
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            old_value: None,
            new_value: None,
            change_type: None,
        }
    }

    /// A builder pre-annotated as [`ChangeType::Modified`].
    #[must_use]
    pub fn modified(field: impl Into<String>) -> Self {
        Self::new(field).change_type(ChangeType::Modified)
    }

    /// Sets the value before the change. `null` means "did not exist".
    #[must_use]
    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.old_value = present(Some(value.into()));
        self
    }

    /// Sets the value after the change. `null` means "no longer exists".
    #[must_use]
    pub fn to(mut self, value: impl Into<Value>) -> Self {
        self.new_value = present(Some(value.into()));
        self
    }

    /// Annotates the change explicitly, overriding inference.
    #[must_use]
    pub const fn change_type(mut self, change_type: ChangeType) -> Self {
        self.change_type = Some(change_type);
        self
    }

    /// Builds the change, inferring its type when none was given.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the field path is empty.
    pub fn build(self) -> Result<Change, ValidationError> {
        if self.field.is_empty() {
            return Err(ValidationError::empty("change.field"));
        }
        Ok(Change::resolved(
            self.field,
            self.old_value,
            self.new_value,
            self.change_type,
        ))
    }
}

impl Change {
    /// A change recording that `field` was added with `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the field path is empty.
    pub fn added(field: impl Into<String>, value: impl Into<Value>) -> Result<Self, ValidationError> {
        ChangeBuilder::new(field)
            .to(value)
            .change_type(ChangeType::Added)
            .build()
    }

    /// A change recording that `field` (previously `value`) was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the field path is empty.
    pub fn removed(field: impl Into<String>, value: impl Into<Value>) -> Result<Self, ValidationError> {
        ChangeBuilder::new(field)
            .from(value)
            .change_type(ChangeType::Removed)
            .build()
    }
}

/// Builder for [`Outcome`].
#[derive(Debug, Clone)]
pub struct OutcomeBuilder {
    outcome: Outcome,
}

impl OutcomeBuilder {
    /// Starts from a successful outcome.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            outcome: Outcome::success(),
        }
    }

    /// Starts from a failed outcome with the given code and message.
    #[must_use]
    pub fn failure(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::failure(error_code, error_message),
        }
    }

    /// Overrides the success flag.
    #[must_use]
    pub const fn succeeded(mut self, success: bool) -> Self {
        self.outcome.success = success;
        self
    }

    /// Sets the error code.
    #[must_use]
    pub fn error_code(mut self, error_code: impl Into<String>) -> Self {
        self.outcome.error_code = Some(error_code.into());
        self
    }

    /// Sets the error message.
    #[must_use]
    pub fn error_message(mut self, error_message: impl Into<String>) -> Self {
        self.outcome.error_message = Some(error_message.into());
        self
    }

    /// Sets the duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.outcome.duration_ms = Some(duration_ms);
        self
    }

    /// Returns the outcome.
    #[must_use]
    pub fn build(self) -> Outcome {
        self.outcome
    }
}
