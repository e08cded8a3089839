//! Property-based tests for custos-core.
//!
//! These tests use proptest to verify invariants across many randomly generated inputs.

use proptest::prelude::*;

use crate::{
    infer_change_type, ActionCategory, ActorBuilder, AuditEventBuilder, ChangeBuilder, ChangeType,
    Resource, ResourceBuilder, Value,
};

/// Strategy for generating resource types.
fn resource_type_strategy() -> impl Strategy<Value = String> {
    "(project|task|comment|order|invoice|document)"
}

/// Strategy for generating resource ids.
fn resource_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,12}"
}

/// Strategy for generating scalar JSON values.
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
        prop::collection::vec("[a-z]{1,4}", 0..3).prop_map(Value::from),
    ]
}

fn change_type_strategy() -> impl Strategy<Value = ChangeType> {
    prop_oneof![
        Just(ChangeType::Added),
        Just(ChangeType::Modified),
        Just(ChangeType::Removed),
        Just(ChangeType::Unchanged),
    ]
}

/// Builds a chain from `(type, id)` pairs listed root first.
fn build_chain(segments: &[(String, String)]) -> Resource {
    let mut current: Option<Resource> = None;
    for (resource_type, id) in segments {
        let mut builder = ResourceBuilder::new(resource_type, id);
        if let Some(parent) = current.take() {
            builder = builder.parent(parent);
        }
        current = Some(builder.build().unwrap());
    }
    current.unwrap()
}

proptest! {
    #[test]
    fn explicit_change_type_always_wins(
        old in prop::option::of(value_strategy()),
        new in prop::option::of(value_strategy()),
        explicit in change_type_strategy(),
    ) {
        prop_assert_eq!(infer_change_type(old.as_ref(), new.as_ref(), Some(explicit)), explicit);
    }

    #[test]
    fn inference_matches_presence_and_equality(
        old in prop::option::of(value_strategy()),
        new in prop::option::of(value_strategy()),
    ) {
        let expected = match (&old, &new) {
            (None, Some(_)) => ChangeType::Added,
            (Some(_), None) => ChangeType::Removed,
            (Some(a), Some(b)) if a != b => ChangeType::Modified,
            _ => ChangeType::Unchanged,
        };
        prop_assert_eq!(infer_change_type(old.as_ref(), new.as_ref(), None), expected);
    }

    #[test]
    fn built_change_stores_inferred_type(
        old in value_strategy(),
        new in value_strategy(),
    ) {
        let change = ChangeBuilder::new("field").from(old.clone()).to(new.clone()).build().unwrap();
        let expected = if old == new { ChangeType::Unchanged } else { ChangeType::Modified };
        prop_assert_eq!(change.change_type(), expected);
    }

    #[test]
    fn full_path_lists_every_segment_root_first(
        segments in prop::collection::vec((resource_type_strategy(), resource_id_strategy()), 1..8),
    ) {
        let resource = build_chain(&segments);
        let expected = segments
            .iter()
            .map(|(t, id)| format!("{t}:{id}"))
            .collect::<Vec<_>>()
            .join("/");
        prop_assert_eq!(resource.full_path(), expected);
        prop_assert_eq!(resource.depth(), segments.len());
    }

    #[test]
    fn build_preserves_supplied_fields(
        source in "[a-z][a-z-]{0,20}",
        action in "[a-z]{1,8}\\.[a-z]{1,8}\\.[a-z]{1,8}",
        user_id in "user-[0-9]{1,6}",
        resource_type in resource_type_strategy(),
        resource_id in resource_id_strategy(),
    ) {
        let actor = ActorBuilder::user(&user_id).build().unwrap();
        let resource = ResourceBuilder::new(&resource_type, &resource_id).build().unwrap();
        let event = AuditEventBuilder::new()
            .source(&source)
            .action(&action)
            .category(ActionCategory::Update)
            .actor(actor.clone())
            .resource(resource.clone())
            .build()
            .unwrap();

        prop_assert_eq!(event.source(), source.as_str());
        prop_assert_eq!(event.action(), action.as_str());
        prop_assert_eq!(event.actor(), &actor);
        prop_assert_eq!(event.resource(), &resource);
        prop_assert!(!event.event_id().is_empty());
        prop_assert_eq!(event.version(), "1.0");
    }

    #[test]
    fn missing_field_reported_by_priority(mask in 0u8..31) {
        // Bit i set means the i-th mandatory field (source, action, category,
        // actor, resource) is supplied; 31 would be a complete event.
        let names = ["source", "action", "category", "actor", "resource"];
        let mut builder = AuditEventBuilder::new();
        if mask & 1 != 0 { builder = builder.source("svc"); }
        if mask & 2 != 0 { builder = builder.action("a.b.c"); }
        if mask & 4 != 0 { builder = builder.category(ActionCategory::View); }
        if mask & 8 != 0 { builder = builder.actor(ActorBuilder::system().build().unwrap()); }
        if mask & 16 != 0 { builder = builder.resource(ResourceBuilder::new("t", "1").build().unwrap()); }

        let first_missing = (0..5).find(|i| mask & (1 << i) == 0).unwrap();
        let err = builder.build().unwrap_err();
        prop_assert_eq!(err.field.as_str(), names[first_missing]);
    }

    #[test]
    fn security_criticality_rule(
        category in prop_oneof![
            Just(ActionCategory::Create),
            Just(ActionCategory::View),
            Just(ActionCategory::Delete),
            Just(ActionCategory::Login),
            Just(ActionCategory::Export),
        ],
        tags in prop::collection::btree_set("(security|critical|access|export|audit)", 0..3),
    ) {
        let event = AuditEventBuilder::new()
            .source("svc")
            .action("a.b.c")
            .category(category)
            .actor(ActorBuilder::system().build().unwrap())
            .resource(ResourceBuilder::new("t", "1").build().unwrap())
            .tags(tags.iter().cloned())
            .build()
            .unwrap();

        let expected = matches!(category, ActionCategory::Delete | ActionCategory::Login)
            || tags.contains("security")
            || tags.contains("critical");
        prop_assert_eq!(event.is_security_critical(), expected);
    }
}
