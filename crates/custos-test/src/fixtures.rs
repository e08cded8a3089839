//! Ready-made audit events for tests.
//!
//! Fixtures use a fixed event id and timestamp so encoded output is stable
//! across runs.

use chrono::{DateTime, TimeZone, Utc};
use custos_core::{
    ActionCategory, ActorBuilder, AuditEvent, AuditEventBuilder, ChangeBuilder, ChangeType,
    OutcomeBuilder,
};
use serde_json::json;

use crate::mock_actor::{MockActor, MockResource};

/// Event id carried by every fixture event.
pub const FIXTURE_EVENT_ID: &str = "00000000-0000-4000-8000-000000000001";

/// Timestamp carried by every fixture event: 2024-05-01T12:30:00Z.
#[must_use]
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
        .single()
        .unwrap_or_else(|| panic!("fixture timestamp is ambiguous"))
}

fn base() -> AuditEventBuilder {
    AuditEventBuilder::new()
        .event_id(FIXTURE_EVENT_ID)
        .timestamp(fixture_timestamp())
}

fn finish(builder: AuditEventBuilder) -> AuditEvent {
    builder
        .build()
        .unwrap_or_else(|e| panic!("invalid fixture event: {e}"))
}

/// A minimal valid event: only the mandatory fields are set.
///
/// # Panics
///
/// Never in practice; the fixture is always valid.
#[must_use]
pub fn sample_event() -> AuditEvent {
    finish(
        base()
            .source("order-service")
            .action("orders.order.viewed")
            .category(ActionCategory::View)
            .actor(MockActor::viewer())
            .resource(MockResource::order("ord-1")),
    )
}

/// An event with every optional field populated, including a delegated
/// actor, a three-level resource chain, changes of every type, a failed
/// outcome, nested metadata and several tags.
///
/// # Panics
///
/// Never in practice; the fixture is always valid.
#[must_use]
pub fn fully_populated_event() -> AuditEvent {
    let actor = ActorBuilder::user("agent-42")
        .session_id("sess-9f2")
        .roles(["support", "billing-reader"])
        .ip_address("192.0.2.10")
        .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
        .on_behalf_of_with("customer-7", Some("Jane Customer"), Some("ticket #4711"))
        .attribute("department", "support")
        .attribute("mfa", true)
        .build()
        .unwrap_or_else(|e| panic!("invalid fixture actor: {e}"));

    let resource = MockResource::new("comment", "c-789")
        .named("Status update")
        .within("task", "t-456")
        .within("project", "p-123")
        .build();

    let changes = [
        ChangeBuilder::new("status").from("open").to("closed").build(),
        ChangeBuilder::new("assignee.id").to("user-3").build(),
        ChangeBuilder::new("labels").from(json!(["bug", "urgent"])).build(),
        ChangeBuilder::new("priority").from(2).to(2).build(),
        ChangeBuilder::new("body")
            .from("draft")
            .to("final")
            .change_type(ChangeType::Modified)
            .build(),
    ]
    .into_iter()
    .collect::<Result<Vec<_>, _>>()
    .unwrap_or_else(|e| panic!("invalid fixture change: {e}"));

    finish(
        base()
            .version("1.0")
            .source("task-service")
            .correlation_id("req-abc-123")
            .action("tasks.comment.updated")
            .category(ActionCategory::Update)
            .actor(actor)
            .resource(resource)
            .changes(changes)
            .outcome(
                OutcomeBuilder::failure("CONFLICT", "comment was edited concurrently")
                    .duration_ms(37)
                    .build(),
            )
            .metadata("requestPath", "/api/tasks/t-456/comments/c-789")
            .metadata("retry", json!({"attempt": 2, "max": 3}))
            .tags(["modification", "support", "security"]),
    )
}

/// A representative set of events covering every actor type and the
/// security-sensitive categories.
#[must_use]
pub fn event_catalog() -> Vec<AuditEvent> {
    vec![
        sample_event(),
        fully_populated_event(),
        finish(
            base()
                .source("auth-service")
                .action("auth.user.login")
                .category(ActionCategory::Login)
                .actor(MockActor::new("user-1").with_session("s-1").with_ip("10.0.0.1").build())
                .resource(MockResource::new("session", "s-1").build())
                .outcome(OutcomeBuilder::success().build()),
        ),
        finish(
            base()
                .source("scheduler")
                .action("reports.report.archived")
                .category(ActionCategory::Archive)
                .actor(
                    ActorBuilder::scheduler()
                        .build()
                        .unwrap_or_else(|e| panic!("invalid fixture actor: {e}")),
                )
                .resource(MockResource::new("report", "r-2024-04").build()),
        ),
        finish(
            base()
                .source("iam")
                .action("iam.permission.changed")
                .category(ActionCategory::PermissionChange)
                .actor(MockActor::service("svc-provisioner"))
                .resource(MockResource::new("workspace", "ws-1").build())
                .tag("critical"),
        ),
    ]
}
