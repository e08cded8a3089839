//! # Custos Core
//!
//! Canonical audit-event model for recording "who did what to what, with
//! what result" in a structurally consistent, machine-parseable way.
//!
//! This crate provides:
//!
//! - [`AuditEvent`] - the aggregate root, with [`AuditEvent::is_security_critical`]
//!   and [`AuditEvent::summary`]
//! - [`Actor`], [`Resource`], [`Change`], [`Outcome`] - immutable value types
//! - [`AuditEventBuilder`] and the narrower builders - the validated way to
//!   construct all of the above
//! - [`infer_change_type`] and [`Resource::full_path`] - the derivation rules
//! - [`factory`] - templates for common event shapes
//!
//! Wire encoding lives in the `custos-codec` crate.
//!
//! ## Example
//!
//! ```rust
//! use custos_core::{ActionCategory, ActorBuilder, AuditEventBuilder, ResourceBuilder};
//!
//! let event = AuditEventBuilder::new()
//!     .source("document-service")
//!     .action("docs.document.deleted")
//!     .category(ActionCategory::Delete)
//!     .actor(ActorBuilder::user("user-42").build()?)
//!     .resource(ResourceBuilder::new("document", "doc-7").build()?)
//!     .build()?;
//!
//! assert!(event.is_security_critical());
//! # Ok::<(), custos_core::ValidationError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;

pub mod actor;
pub mod builder;
pub mod change;
pub mod event;
pub mod factory;
pub mod outcome;
pub mod resource;
pub mod validation;

#[cfg(test)]
mod proptest_tests;

pub use actor::{Actor, ActorType, OnBehalfOf};
pub use builder::{ActorBuilder, AuditEventBuilder, ChangeBuilder, OutcomeBuilder, ResourceBuilder};
pub use change::{infer_change_type, Change, ChangeType};
pub use event::{ActionCategory, AuditEvent, DEFAULT_SCHEMA_VERSION};
pub use outcome::Outcome;
pub use resource::Resource;
pub use validation::{Validate, ValidationError, ValidationErrorKind, ValidationErrors};

/// JSON-compatible value stored in attributes, metadata and changes.
///
/// A closed union over null, boolean, number, string, array and object.
pub use serde_json::Value;

/// Open string-keyed mapping of JSON values.
pub type Attributes = BTreeMap<String, Value>;
