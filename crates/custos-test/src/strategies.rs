//! Proptest strategies for generating valid audit events.

use chrono::{DateTime, Utc};
use custos_core::{
    ActionCategory, Actor, ActorBuilder, ActorType, AuditEvent, AuditEventBuilder, Change,
    ChangeBuilder, ChangeType, Outcome, OutcomeBuilder, Resource, ResourceBuilder, Value,
};
use proptest::prelude::*;

/// Every action category.
pub const ALL_CATEGORIES: [ActionCategory; 16] = [
    ActionCategory::Create,
    ActionCategory::Update,
    ActionCategory::Delete,
    ActionCategory::View,
    ActionCategory::Export,
    ActionCategory::Import,
    ActionCategory::Login,
    ActionCategory::Logout,
    ActionCategory::PermissionChange,
    ActionCategory::ConfigurationChange,
    ActionCategory::Execute,
    ActionCategory::Download,
    ActionCategory::Upload,
    ActionCategory::Share,
    ActionCategory::Archive,
    ActionCategory::Restore,
];

/// Every actor type.
pub const ALL_ACTOR_TYPES: [ActorType; 5] = [
    ActorType::User,
    ActorType::System,
    ActorType::Scheduler,
    ActorType::ServiceAccount,
    ActorType::ExternalService,
];

/// Strategy for action categories.
pub fn category_strategy() -> impl Strategy<Value = ActionCategory> {
    prop::sample::select(ALL_CATEGORIES.to_vec())
}

/// Strategy for actor types.
pub fn actor_type_strategy() -> impl Strategy<Value = ActorType> {
    prop::sample::select(ALL_ACTOR_TYPES.to_vec())
}

/// Strategy for timestamps with nanosecond precision between 1970 and 2096.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        DateTime::from_timestamp(secs, nanos).unwrap_or_default()
    })
}

/// Strategy for non-null JSON values, including finite floats, nested up to
/// two levels.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        finite_f64().prop_map(Value::from),
        "[a-zA-Z0-9 _.:/-]{0,24}".prop_map(Value::from),
    ];
    leaf.prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z][a-zA-Z]{0,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn finite_f64() -> impl Strategy<Value = f64> {
    use prop::num::f64::{NEGATIVE, NORMAL, POSITIVE, SUBNORMAL, ZERO};
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

/// Strategy for attribute and metadata maps. Values may be JSON null.
pub fn attributes_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(
        (
            "[a-z][a-zA-Z]{0,10}",
            prop_oneof![4 => value_strategy(), 1 => Just(Value::Null)],
        ),
        0..4,
    )
}

fn opt_text(pattern: &'static str) -> impl Strategy<Value = Option<String>> {
    prop::option::of(pattern)
}

/// Strategy for actors of every type.
pub fn actor_strategy() -> impl Strategy<Value = Actor> {
    (
        actor_type_strategy(),
        opt_text("[a-z]{1,8}-[0-9]{1,4}"),
        opt_text("sess-[a-f0-9]{4,12}"),
        prop::collection::vec("[a-z_]{1,10}", 0..3),
        opt_text("(10|172|192)\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}"),
        opt_text("[A-Za-z]{1,10}/[0-9]\\.[0-9]"),
        prop::option::of((
            "[a-z]{1,8}-[0-9]{1,4}",
            opt_text("[A-Z][a-z]{1,8} [A-Z][a-z]{1,8}"),
            opt_text("[a-z ]{1,20}"),
        )),
        attributes_strategy(),
    )
        .prop_map(
            |(actor_type, user_id, session_id, roles, ip, agent, delegation, attributes)| {
                let mut builder = ActorBuilder::new(actor_type).roles(roles);
                if let Some(user_id) = user_id {
                    builder = builder.user_id(user_id);
                }
                if let Some(session_id) = session_id {
                    builder = builder.session_id(session_id);
                }
                if let Some(ip) = ip {
                    builder = builder.ip_address(ip);
                }
                if let Some(agent) = agent {
                    builder = builder.user_agent(agent);
                }
                if let Some((user_id, user_name, reason)) = delegation {
                    builder = builder.on_behalf_of_with(user_id, user_name, reason);
                }
                for (key, value) in attributes {
                    builder = builder.attribute(key, value);
                }
                builder
                    .build()
                    .unwrap_or_else(|e| panic!("generated invalid actor: {e}"))
            },
        )
}

/// Strategy for resources with a parent chain of up to `max_depth` levels.
pub fn resource_strategy(max_depth: usize) -> impl Strategy<Value = Resource> {
    prop::collection::vec(
        (
            "(project|task|comment|order|invoice|document|folder)",
            "[a-z0-9-]{1,12}",
            opt_text("[A-Za-z ]{1,16}"),
            attributes_strategy(),
        ),
        1..=max_depth.max(1),
    )
    .prop_map(|levels| {
        // Levels are listed root first.
        let mut current: Option<Resource> = None;
        for (resource_type, id, display_name, attributes) in levels {
            let mut builder = ResourceBuilder::new(resource_type, id);
            if let Some(name) = display_name {
                builder = builder.display_name(name);
            }
            if let Some(parent) = current.take() {
                builder = builder.parent(parent);
            }
            for (key, value) in attributes {
                builder = builder.attribute(key, value);
            }
            current = Some(
                builder
                    .build()
                    .unwrap_or_else(|e| panic!("generated invalid resource: {e}")),
            );
        }
        current.unwrap_or_else(|| panic!("resource chain is never empty"))
    })
}

/// Strategy for changes, with or without an explicit change type.
pub fn change_strategy() -> impl Strategy<Value = Change> {
    (
        "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
        prop::option::of(value_strategy()),
        prop::option::of(value_strategy()),
        prop::option::of(prop::sample::select(vec![
            ChangeType::Added,
            ChangeType::Modified,
            ChangeType::Removed,
            ChangeType::Unchanged,
        ])),
    )
        .prop_map(|(field, old, new, explicit)| {
            let mut builder = ChangeBuilder::new(field);
            if let Some(old) = old {
                builder = builder.from(old);
            }
            if let Some(new) = new {
                builder = builder.to(new);
            }
            if let Some(change_type) = explicit {
                builder = builder.change_type(change_type);
            }
            builder
                .build()
                .unwrap_or_else(|e| panic!("generated invalid change: {e}"))
        })
}

/// Strategy for outcomes.
pub fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    (
        any::<bool>(),
        opt_text("[A-Z_]{3,16}"),
        opt_text("[a-zA-Z ]{1,32}"),
        prop::option::of(any::<u64>()),
    )
        .prop_map(|(success, code, message, duration)| {
            let mut builder = OutcomeBuilder::success().succeeded(success);
            if let Some(code) = code {
                builder = builder.error_code(code);
            }
            if let Some(message) = message {
                builder = builder.error_message(message);
            }
            if let Some(duration) = duration {
                builder = builder.duration_ms(duration);
            }
            builder.build()
        })
}

/// Strategy for complete, valid audit events.
pub fn audit_event_strategy() -> impl Strategy<Value = AuditEvent> {
    let header = (
        "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
        timestamp_strategy(),
        "[a-z][a-z-]{0,20}",
        opt_text("req-[a-z0-9]{4,16}"),
        "[a-z]{1,8}\\.[a-z]{1,8}\\.[a-z]{1,8}",
        category_strategy(),
    );
    let body = (
        actor_strategy(),
        resource_strategy(4),
        prop::collection::vec(change_strategy(), 0..4),
        prop::option::of(outcome_strategy()),
        attributes_strategy(),
        prop::collection::btree_set("[a-z-]{1,12}", 0..4),
    );

    (header, body).prop_map(
        |(
            (event_id, timestamp, source, correlation_id, action, category),
            (actor, resource, changes, outcome, metadata, tags),
        )| {
            let mut builder = AuditEventBuilder::new()
                .event_id(event_id)
                .timestamp(timestamp)
                .source(source)
                .action(action)
                .category(category)
                .actor(actor)
                .resource(resource)
                .changes(changes)
                .tags(tags);
            if let Some(correlation_id) = correlation_id {
                builder = builder.correlation_id(correlation_id);
            }
            if let Some(outcome) = outcome {
                builder = builder.outcome(outcome);
            }
            for (key, value) in metadata {
                builder = builder.metadata(key, value);
            }
            builder
                .build()
                .unwrap_or_else(|e| panic!("generated invalid event: {e}"))
        },
    )
}
