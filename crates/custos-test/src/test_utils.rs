//! Assertion helpers and test logging.

use std::sync::Once;

use custos_core::{AuditEvent, ChangeType, ValidationError, ValidationErrorKind};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// Output goes through the test harness capture and honours `RUST_LOG`,
/// defaulting to `debug` for the custos crates.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("custos_core=debug,custos_codec=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Asserts that a build was rejected because of `field`.
///
/// # Panics
///
/// Panics if the result is `Ok` or names a different field.
#[track_caller]
pub fn assert_rejected<T: std::fmt::Debug>(result: Result<T, ValidationError>, field: &str) {
    match result {
        Ok(value) => panic!("expected '{field}' to be rejected, but built {value:?}"),
        Err(e) => assert_eq!(
            e.field, field,
            "expected '{field}' to be rejected, but got: {e}"
        ),
    }
}

/// Asserts that a build was rejected because `field` was never supplied.
///
/// # Panics
///
/// Panics if the result is `Ok`, names a different field, or reports a
/// kind other than [`ValidationErrorKind::Required`].
#[track_caller]
pub fn assert_missing<T: std::fmt::Debug>(result: Result<T, ValidationError>, field: &str) {
    match result {
        Ok(value) => panic!("expected '{field}' to be missing, but built {value:?}"),
        Err(e) => {
            assert_eq!(e.field, field, "wrong field reported: {e}");
            assert_eq!(e.kind, ValidationErrorKind::Required, "wrong kind reported: {e}");
        }
    }
}

/// Asserts that the event records a change to `field` of the given type.
///
/// # Panics
///
/// Panics if no change to `field` exists or its type differs.
#[track_caller]
pub fn assert_change(event: &AuditEvent, field: &str, expected: ChangeType) {
    let Some(change) = event.changes().iter().find(|c| c.field() == field) else {
        let fields: Vec<_> = event.changes().iter().map(|c| c.field()).collect();
        panic!("no change to '{field}' recorded; changes: {fields:?}");
    };
    assert_eq!(
        change.change_type(),
        expected,
        "change to '{field}' has the wrong type"
    );
}

/// Asserts that the event is classified as security-critical.
///
/// # Panics
///
/// Panics if it is not.
#[track_caller]
pub fn assert_security_critical(event: &AuditEvent) {
    assert!(
        event.is_security_critical(),
        "expected a security-critical event: {}",
        event.summary()
    );
}
