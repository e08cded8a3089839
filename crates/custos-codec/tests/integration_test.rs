//! Integration tests for the audit event wire format.
//!
//! These tests push fixture, factory-built and generated events through the
//! serializer and check the documents against the published schema.

use proptest::prelude::*;
use serde_json::{json, Value};

use custos_codec::{
    actor_schema, audit_event_schema, change_schema, outcome_schema, resource_schema,
    AuditEventSerializer, DecodeError, EncodeMode, EventSchema,
};
use custos_core::{
    factory, ActionCategory, ActorBuilder, AuditEvent, AuditEventBuilder, ChangeType,
    ResourceBuilder,
};
use custos_test::{
    assert_change, audit_event_strategy, event_catalog, fixture_timestamp, fully_populated_event,
    init_test_tracing, sample_event, MockActor, FIXTURE_EVENT_ID,
};

fn round_trip(event: &AuditEvent, mode: EncodeMode) -> AuditEvent {
    let serializer = AuditEventSerializer::default();
    let encoded = serializer
        .encode(event, mode)
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    serializer
        .decode(&encoded)
        .unwrap_or_else(|e| panic!("decode failed: {e}\n{encoded}"))
}

/// Checks one object of the document against its schema.
fn assert_conforms(schema: &EventSchema, object: &Value) {
    assert!(
        schema.missing_required(object).is_empty(),
        "{} is missing {:?}",
        schema.name,
        schema.missing_required(object)
    );
    assert!(
        schema.unknown_fields(object).is_empty(),
        "{} has undeclared fields {:?}",
        schema.name,
        schema.unknown_fields(object)
    );
}

fn assert_document_conforms(document: &Value) {
    assert_conforms(&audit_event_schema(), document);
    assert_conforms(&actor_schema(), &document["actor"]);

    let mut resource = Some(&document["resource"]);
    while let Some(current) = resource {
        assert_conforms(&resource_schema(), current);
        resource = current.get("parentResource");
    }
    for change in document["changes"].as_array().into_iter().flatten() {
        assert_conforms(&change_schema(), change);
    }
    if let Some(outcome) = document.get("outcome") {
        assert_conforms(&outcome_schema(), outcome);
    }
}

fn no_nulls_outside_free_form(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => items.iter().all(no_nulls_outside_free_form),
        Value::Object(map) => map.iter().all(|(key, v)| {
            matches!(key.as_str(), "metadata" | "attributes" | "oldValue" | "newValue")
                || no_nulls_outside_free_form(v)
        }),
        _ => true,
    }
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_fixture_catalog_round_trips_in_both_modes() {
    init_test_tracing();
    for event in event_catalog() {
        assert_eq!(round_trip(&event, EncodeMode::Compact), event);
        assert_eq!(round_trip(&event, EncodeMode::Pretty), event);
    }
}

#[test]
fn test_fully_populated_document_shape() {
    let serializer = AuditEventSerializer::default();
    let document = serializer.to_value(&fully_populated_event()).unwrap();

    assert_eq!(document["eventId"], FIXTURE_EVENT_ID);
    assert_eq!(document["timestamp"], "2024-05-01T12:30:00Z");
    assert_eq!(document["category"], "UPDATE");
    assert_eq!(document["actor"]["actorType"], "USER");
    assert_eq!(document["actor"]["onBehalfOf"]["userName"], "Jane Customer");
    assert_eq!(
        document["resource"]["parentResource"]["parentResource"],
        json!({"type": "project", "id": "p-123", "attributes": {}})
    );
    assert_eq!(
        document["changes"][1],
        json!({"field": "assignee.id", "newValue": "user-3", "changeType": "ADDED"})
    );
    assert_eq!(document["outcome"]["errorCode"], "CONFLICT");
    assert_eq!(document["outcome"]["durationMs"], 37);
    assert_eq!(document["tags"], json!(["modification", "security", "support"]));

    assert_document_conforms(&document);
}

#[test]
fn test_minimal_document_omits_absent_fields() {
    let serializer = AuditEventSerializer::default();
    let document = serializer.to_value(&sample_event()).unwrap();

    assert!(document.get("correlationId").is_none());
    assert!(document.get("outcome").is_none());
    assert!(document["resource"].get("parentResource").is_none());
    assert!(no_nulls_outside_free_form(&document));
    assert_document_conforms(&document);
}

#[test]
fn test_factory_events_round_trip() {
    let admin = MockActor::admin();
    let events = vec![
        factory::login(
            "auth-service",
            "user-1",
            "s-1",
            Some("10.0.0.1"),
            None,
            false,
            Some("bad password"),
        )
        .unwrap(),
        factory::logout("auth-service", "user-1", "s-1").unwrap(),
        factory::resource_created(
            "orders",
            &admin,
            "order",
            "o-1",
            Some("Order #1"),
            None,
            [("total".to_string(), json!(1250)), ("currency".to_string(), json!("EUR"))],
        )
        .unwrap(),
        factory::resource_updated(
            "orders",
            &admin,
            "order",
            "o-1",
            None,
            None,
            [
                ("status".to_string(), Some(json!("pending")), Some(json!("shipped"))),
                ("note".to_string(), None, Some(json!("gift"))),
            ],
        )
        .unwrap(),
        factory::resource_deleted(
            "orders",
            &admin,
            "order",
            "o-1",
            None,
            None,
            [("status".to_string(), json!("shipped"))],
        )
        .unwrap(),
        factory::resource_viewed("orders", &admin, "order", "o-1", None, None).unwrap(),
        factory::permission_changed(
            "iam",
            &admin,
            "user-9",
            "workspace",
            "ws-1",
            &["read".to_string()],
            &["read".to_string(), "write".to_string()],
        )
        .unwrap(),
        factory::data_export(
            "reports",
            &admin,
            "invoice",
            &["i-1".to_string(), "i-2".to_string()],
            "csv",
        )
        .unwrap(),
    ];

    let serializer = AuditEventSerializer::default();
    for event in &events {
        let document = serializer.to_value(event).unwrap();
        assert_document_conforms(&document);
        assert_eq!(&round_trip(event, EncodeMode::Compact), event);
    }

    let updated = round_trip(&events[3], EncodeMode::Pretty);
    assert_change(&updated, "status", ChangeType::Modified);
    assert_change(&updated, "note", ChangeType::Added);
}

fn event_with_metadata(key: &str, value: Value) -> AuditEvent {
    AuditEventBuilder::new()
        .source("metrics-service")
        .action("metrics.sample.recorded")
        .category(ActionCategory::Execute)
        .actor(ActorBuilder::system().build().unwrap())
        .resource(ResourceBuilder::new("sample", "s-1").build().unwrap())
        .metadata(key, value)
        .build()
        .unwrap()
}

#[test]
fn test_float_metadata_round_trips_exactly() {
    for value in [1.071_566_039_146_582_6e-75, 0.1, -2.5, 1e308, 5e-324, 0.0] {
        let event = event_with_metadata("ratio", json!(value));
        for mode in [EncodeMode::Compact, EncodeMode::Pretty] {
            let decoded = round_trip(&event, mode);
            assert_eq!(decoded.metadata()["ratio"].as_f64(), Some(value), "{value:e}");
            assert_eq!(decoded, event);
        }
    }
}

#[test]
fn test_deep_resource_chain_round_trips() {
    init_test_tracing();
    let mut resource = ResourceBuilder::new("folder", "f-0").build().unwrap();
    for depth in 1..=200 {
        resource = ResourceBuilder::new("folder", format!("f-{depth}"))
            .parent(resource)
            .build()
            .unwrap();
    }
    let event = AuditEventBuilder::new()
        .source("document-service")
        .action("docs.folder.viewed")
        .category(ActionCategory::View)
        .actor(ActorBuilder::user("user-1").build().unwrap())
        .resource(resource)
        .build()
        .unwrap();

    assert_eq!(round_trip(&event, EncodeMode::Compact), event);
    assert_eq!(round_trip(&event, EncodeMode::Pretty), event);

    let serializer = AuditEventSerializer::default();
    let bytes = serializer.to_bytes(&event).unwrap();
    assert_eq!(serializer.decode_bytes(&bytes).unwrap(), event);
}

#[test]
fn test_deep_metadata_round_trips() {
    let mut nested = json!("leaf");
    for _ in 0..200 {
        nested = json!([nested]);
    }
    let event = event_with_metadata("trace", nested);

    assert_eq!(round_trip(&event, EncodeMode::Compact), event);
    assert_eq!(round_trip(&event, EncodeMode::Pretty), event);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_handwritten_document() {
    let document = r#"{
        "eventId": "3f1c2d9e-8a77-4c1b-9d4e-2b7a1c0f5e11",
        "timestamp": "2024-05-01T14:30:00+02:00",
        "source": "document-service",
        "actor": {"actorType": "SERVICE_ACCOUNT", "userId": "svc-indexer"},
        "action": "docs.document.deleted",
        "category": "DELETE",
        "resource": {
            "type": "document",
            "id": "doc-7",
            "parentResource": {"type": "folder", "id": "f-1"}
        },
        "changes": [{"field": "title", "oldValue": "Q1 plan"}],
        "schemaHints": {"x": 1}
    }"#;

    let event = AuditEventSerializer::default().decode(document).unwrap();

    assert_eq!(event.version(), "1.0");
    assert_eq!(event.timestamp(), fixture_timestamp());
    assert_eq!(event.category(), ActionCategory::Delete);
    assert_eq!(event.resource().full_path(), "folder:f-1/document:doc-7");
    assert_change(&event, "title", ChangeType::Removed);
    assert!(event.is_security_critical());
    assert_eq!(
        event.summary(),
        "svc-indexer successfully performed 'docs.document.deleted' on document:doc-7"
    );
}

#[test]
fn test_decode_rejects_each_missing_mandatory_field() {
    let serializer = AuditEventSerializer::default();
    let document = serializer.to_value(&sample_event()).unwrap();

    for field in audit_event_schema().required_fields {
        let mut broken = document.clone();
        broken.as_object_mut().unwrap().remove(&field.name);

        let err = serializer.decode(&broken.to_string()).unwrap_err();
        assert!(
            matches!(err, DecodeError::Shape(_)),
            "removing '{}' gave {err:?}",
            field.name
        );
    }
}

#[test]
fn test_decode_rejects_non_object_documents() {
    let serializer = AuditEventSerializer::default();
    for input in ["[]", "42", "\"event\"", "null"] {
        assert!(matches!(serializer.decode(input), Err(DecodeError::Shape(_))), "{input}");
    }
    assert!(matches!(serializer.decode(""), Err(DecodeError::Malformed(_))));
}

#[test]
fn test_decode_rejects_empty_source() {
    let serializer = AuditEventSerializer::default();
    let mut document = serializer.to_value(&sample_event()).unwrap();
    document["source"] = json!("");

    let err = serializer.decode_value(document).unwrap_err();
    assert_eq!(err.category(), "invalid");
    assert!(err.to_string().contains("source"));
}

#[test]
fn test_plain_serde_decode_rejects_empty_resource_id() {
    let mut document = AuditEventSerializer::default()
        .to_value(&sample_event())
        .unwrap();
    document["resource"]["id"] = json!("");

    let err = serde_json::from_value::<AuditEvent>(document).unwrap_err();
    assert!(err.to_string().contains("resource.id"), "{err}");
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generated_events_round_trip(event in audit_event_strategy(), pretty in any::<bool>()) {
        let mode = if pretty { EncodeMode::Pretty } else { EncodeMode::Compact };
        prop_assert_eq!(round_trip(&event, mode), event);
    }

    #[test]
    fn generated_documents_conform_to_schema(event in audit_event_strategy()) {
        let document = AuditEventSerializer::default().to_value(&event).unwrap();
        assert_document_conforms(&document);
        prop_assert!(no_nulls_outside_free_form(&document));
    }

    #[test]
    fn bytes_and_text_agree(event in audit_event_strategy()) {
        let serializer = AuditEventSerializer::default();
        let bytes = serializer.to_bytes(&event).unwrap();
        let text = serializer.encode(&event, EncodeMode::Compact).unwrap();
        prop_assert_eq!(bytes, text.into_bytes());
    }
}
