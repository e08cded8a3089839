//! Templates for common audit event shapes.
//!
//! Every function here is a thin composition over [`AuditEventBuilder`]; the
//! builder remains the only place where events are validated.

use crate::{
    ActionCategory, Actor, ActorBuilder, AuditEvent, AuditEventBuilder, ChangeBuilder,
    OutcomeBuilder, Resource, ResourceBuilder, ValidationError, Value,
};

/// Error code recorded on failed logins that carry a message.
pub const LOGIN_FAILED: &str = "LOGIN_FAILED";

fn target(
    resource_type: &str,
    resource_id: &str,
    display_name: Option<&str>,
) -> Result<Resource, ValidationError> {
    let mut builder = ResourceBuilder::new(resource_type, resource_id);
    if let Some(name) = display_name {
        builder = builder.display_name(name);
    }
    builder.build()
}

fn default_action(source: &str, resource_type: &str, verb: &str) -> String {
    format!("{source}.{resource_type}.{verb}")
}

/// A user login attempt.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `source` or `session_id` is empty.
pub fn login(
    source: &str,
    user_id: &str,
    session_id: &str,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
    success: bool,
    error_message: Option<&str>,
) -> Result<AuditEvent, ValidationError> {
    let mut actor = ActorBuilder::user(user_id).session_id(session_id);
    if let Some(ip) = ip_address {
        actor = actor.ip_address(ip);
    }
    if let Some(agent) = user_agent {
        actor = actor.user_agent(agent);
    }

    let outcome = match (success, error_message) {
        (true, _) => OutcomeBuilder::success(),
        (false, Some(message)) => OutcomeBuilder::failure(LOGIN_FAILED, message),
        (false, None) => OutcomeBuilder::success().succeeded(false),
    };

    AuditEventBuilder::new()
        .source(source)
        .action("auth.user.login")
        .category(ActionCategory::Login)
        .actor(actor.build()?)
        .resource(target("session", session_id, None)?)
        .outcome(outcome.build())
        .tags(["authentication", "security"])
        .build()
}

/// A user logout.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `source` or `session_id` is empty.
pub fn logout(source: &str, user_id: &str, session_id: &str) -> Result<AuditEvent, ValidationError> {
    AuditEventBuilder::new()
        .source(source)
        .action("auth.user.logout")
        .category(ActionCategory::Logout)
        .actor(ActorBuilder::user(user_id).session_id(session_id).build()?)
        .resource(target("session", session_id, None)?)
        .outcome(OutcomeBuilder::success().build())
        .tag("authentication")
        .build()
}

/// Creation of a resource, with one `ADDED` change per initial value.
///
/// The action defaults to `<source>.<resource_type>.created`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any mandatory value is empty.
pub fn resource_created(
    source: &str,
    actor: &Actor,
    resource_type: &str,
    resource_id: &str,
    display_name: Option<&str>,
    action: Option<&str>,
    initial_values: impl IntoIterator<Item = (String, Value)>,
) -> Result<AuditEvent, ValidationError> {
    let changes = initial_values
        .into_iter()
        .map(|(field, value)| ChangeBuilder::new(field).to(value).build())
        .collect::<Result<Vec<_>, _>>()?;

    AuditEventBuilder::new()
        .source(source)
        .action(action.map_or_else(|| default_action(source, resource_type, "created"), str::to_string))
        .category(ActionCategory::Create)
        .actor(actor.clone())
        .resource(target(resource_type, resource_id, display_name)?)
        .changes(changes)
        .tag("creation")
        .build()
}

/// An update to a resource. Each change is `(field, old, new)`; the change
/// type is inferred from the values.
///
/// The action defaults to `<source>.<resource_type>.updated`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any mandatory value is empty.
pub fn resource_updated(
    source: &str,
    actor: &Actor,
    resource_type: &str,
    resource_id: &str,
    display_name: Option<&str>,
    action: Option<&str>,
    changes: impl IntoIterator<Item = (String, Option<Value>, Option<Value>)>,
) -> Result<AuditEvent, ValidationError> {
    let changes = changes
        .into_iter()
        .map(|(field, old, new)| ChangeBuilder::new(field).from(old).to(new).build())
        .collect::<Result<Vec<_>, _>>()?;

    AuditEventBuilder::new()
        .source(source)
        .action(action.map_or_else(|| default_action(source, resource_type, "updated"), str::to_string))
        .category(ActionCategory::Update)
        .actor(actor.clone())
        .resource(target(resource_type, resource_id, display_name)?)
        .changes(changes)
        .tag("modification")
        .build()
}

/// Deletion of a resource, with one `REMOVED` change per final value.
///
/// The action defaults to `<source>.<resource_type>.deleted`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any mandatory value is empty.
pub fn resource_deleted(
    source: &str,
    actor: &Actor,
    resource_type: &str,
    resource_id: &str,
    display_name: Option<&str>,
    action: Option<&str>,
    final_values: impl IntoIterator<Item = (String, Value)>,
) -> Result<AuditEvent, ValidationError> {
    let changes = final_values
        .into_iter()
        .map(|(field, value)| ChangeBuilder::new(field).from(value).build())
        .collect::<Result<Vec<_>, _>>()?;

    AuditEventBuilder::new()
        .source(source)
        .action(action.map_or_else(|| default_action(source, resource_type, "deleted"), str::to_string))
        .category(ActionCategory::Delete)
        .actor(actor.clone())
        .resource(target(resource_type, resource_id, display_name)?)
        .changes(changes)
        .tags(["deletion", "critical"])
        .build()
}

/// A read access to a resource.
///
/// The action defaults to `<source>.<resource_type>.viewed`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any mandatory value is empty.
pub fn resource_viewed(
    source: &str,
    actor: &Actor,
    resource_type: &str,
    resource_id: &str,
    display_name: Option<&str>,
    action: Option<&str>,
) -> Result<AuditEvent, ValidationError> {
    AuditEventBuilder::new()
        .source(source)
        .action(action.map_or_else(|| default_action(source, resource_type, "viewed"), str::to_string))
        .category(ActionCategory::View)
        .actor(actor.clone())
        .resource(target(resource_type, resource_id, display_name)?)
        .tag("access")
        .build()
}

/// A change to `target_user_id`'s permissions on a resource.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any mandatory value is empty.
pub fn permission_changed(
    source: &str,
    actor: &Actor,
    target_user_id: &str,
    resource_type: &str,
    resource_id: &str,
    old_permissions: &[String],
    new_permissions: &[String],
) -> Result<AuditEvent, ValidationError> {
    let change = ChangeBuilder::new(format!("permissions.{target_user_id}"))
        .from(old_permissions.to_vec())
        .to(new_permissions.to_vec())
        .build()?;

    AuditEventBuilder::new()
        .source(source)
        .action("iam.permission.changed")
        .category(ActionCategory::PermissionChange)
        .actor(actor.clone())
        .resource(target(resource_type, resource_id, None)?)
        .add_change(change)
        .metadata("targetUserId", target_user_id)
        .tags(["security", "critical", "permission"])
        .build()
}

/// An export of several resources of one type.
///
/// The resource id is the comma-joined list of ids.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `resource_ids` is empty or any other
/// mandatory value is empty.
pub fn data_export(
    source: &str,
    actor: &Actor,
    resource_type: &str,
    resource_ids: &[String],
    format: &str,
) -> Result<AuditEvent, ValidationError> {
    let display_name = format!("{} {resource_type}(s)", resource_ids.len());

    AuditEventBuilder::new()
        .source(source)
        .action(default_action(source, resource_type, "exported"))
        .category(ActionCategory::Export)
        .actor(actor.clone())
        .resource(target(resource_type, &resource_ids.join(","), Some(&display_name))?)
        .metadata("exportFormat", format)
        .metadata("exportedCount", resource_ids.len())
        .metadata("resourceIds", resource_ids.to_vec())
        .tags(["export", "data-access"])
        .build()
}
