//! The subject performing an audited action.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{require_non_empty, Validate, ValidationErrors};
use crate::Attributes;

/// Kind of subject that performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    /// A human user of the system.
    User,
    /// An internal system process.
    System,
    /// A scheduled job or cron task.
    Scheduler,
    /// An API token or service account.
    ServiceAccount,
    /// An external integration.
    ExternalService,
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::System => write!(f, "SYSTEM"),
            Self::Scheduler => write!(f, "SCHEDULER"),
            Self::ServiceAccount => write!(f, "SERVICE_ACCOUNT"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
        }
    }
}

/// The user on whose behalf an actor is acting (impersonation, delegation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnBehalfOf {
    pub(crate) user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}

impl OnBehalfOf {
    /// The delegating user's id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The delegating user's display name.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Why the actor is acting on the user's behalf.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// The subject performing an action.
///
/// Built through [`ActorBuilder`](crate::ActorBuilder); immutable afterwards.
/// No field other than `actor_type` is mandatory. Whether a `USER` actor must
/// carry a user id is left to the caller's conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ActorRecord")]
pub struct Actor {
    pub(crate) actor_type: ActorType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) session_id: Option<String>,

    pub(crate) roles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) on_behalf_of: Option<OnBehalfOf>,

    pub(crate) attributes: Attributes,
}

/// Wire form of an actor, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActorRecord {
    actor_type: ActorType,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    on_behalf_of: Option<OnBehalfOf>,
    #[serde(default)]
    attributes: Attributes,
}

impl ActorRecord {
    pub(crate) fn into_unchecked(self) -> Actor {
        Actor {
            actor_type: self.actor_type,
            user_id: self.user_id,
            session_id: self.session_id,
            roles: self.roles,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            on_behalf_of: self.on_behalf_of,
            attributes: self.attributes,
        }
    }
}

impl TryFrom<ActorRecord> for Actor {
    type Error = ValidationErrors;

    fn try_from(record: ActorRecord) -> Result<Self, Self::Error> {
        let actor = record.into_unchecked();
        actor.validate()?;
        Ok(actor)
    }
}

impl Actor {
    /// The kind of actor.
    #[must_use]
    pub const fn actor_type(&self) -> ActorType {
        self.actor_type
    }

    /// User, account or service identifier.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Session the action was performed in.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Roles held at the time of the action, in the order given.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Client IP address.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Client user agent.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Delegation details, if the actor acted for someone else.
    #[must_use]
    pub const fn on_behalf_of(&self) -> Option<&OnBehalfOf> {
        self.on_behalf_of.as_ref()
    }

    /// Free-form actor attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Identity used in human-readable renderings: the user id, falling back
    /// to the actor type.
    #[must_use]
    pub fn display_identity(&self) -> String {
        self.user_id
            .clone()
            .unwrap_or_else(|| self.actor_type.to_string())
    }
}

impl Validate for Actor {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(delegation) = &self.on_behalf_of {
            require_non_empty(&mut errors, "onBehalfOf.userId", &delegation.user_id);
        }
        errors.finish()
    }
}
