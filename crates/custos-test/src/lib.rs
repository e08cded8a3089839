//! # Custos Test
//!
//! Test support for crates that produce or consume Custos audit events.
//!
//! This crate provides:
//!
//! - Mock actor and resource builders with sensible defaults
//! - Fixed-id, fixed-timestamp fixture events
//! - Proptest strategies that generate valid events
//! - Assertion helpers and a test tracing subscriber
//!
//! ## Example
//!
//! ```rust
//! use custos_test::{assert_change, fully_populated_event, MockActor};
//! use custos_core::ChangeType;
//!
//! let admin = MockActor::admin();
//! assert_eq!(admin.user_id(), Some("mock-admin"));
//!
//! let event = fully_populated_event();
//! assert_change(&event, "status", ChangeType::Modified);
//! ```

pub mod fixtures;
pub mod mock_actor;
pub mod strategies;
pub mod test_utils;

pub use fixtures::{
    event_catalog, fixture_timestamp, fully_populated_event, sample_event, FIXTURE_EVENT_ID,
};
pub use mock_actor::{MockActor, MockResource};
pub use strategies::audit_event_strategy;
pub use test_utils::{
    assert_change, assert_missing, assert_rejected, assert_security_critical, init_test_tracing,
};
