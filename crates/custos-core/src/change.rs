//! Field-level before/after deltas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{require_non_empty, Validate, ValidationErrors};
use crate::Value;

/// Semantic classification of a field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// The field did not exist before.
    Added,
    /// The field existed and its value changed.
    Modified,
    /// The field no longer exists.
    Removed,
    /// The value is recorded as unchanged.
    Unchanged,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "ADDED"),
            Self::Modified => write!(f, "MODIFIED"),
            Self::Removed => write!(f, "REMOVED"),
            Self::Unchanged => write!(f, "UNCHANGED"),
        }
    }
}

/// Classifies a change from its old and new values.
///
/// An explicit type always wins, even when it disagrees with the values.
/// Otherwise: absent to present is `Added`, present to absent is `Removed`,
/// two different values are `Modified`, and two equal values (or two absent
/// ones) are `Unchanged`.
///
/// # Examples
///
/// ```
/// use custos_core::{infer_change_type, ChangeType, Value};
///
/// let x = Value::from("x");
/// assert_eq!(infer_change_type(None, Some(&x), None), ChangeType::Added);
/// assert_eq!(infer_change_type(Some(&x), Some(&x), None), ChangeType::Unchanged);
/// assert_eq!(
///     infer_change_type(Some(&x), Some(&x), Some(ChangeType::Modified)),
///     ChangeType::Modified,
/// );
/// ```
#[must_use]
pub fn infer_change_type(
    old_value: Option<&Value>,
    new_value: Option<&Value>,
    explicit: Option<ChangeType>,
) -> ChangeType {
    if let Some(change_type) = explicit {
        return change_type;
    }
    match (old_value, new_value) {
        (None, Some(_)) => ChangeType::Added,
        (Some(_), None) => ChangeType::Removed,
        (Some(old), Some(new)) if old != new => ChangeType::Modified,
        _ => ChangeType::Unchanged,
    }
}

/// Treats a JSON `null` the same as an absent value.
pub(crate) fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// A single field-level mutation.
///
/// The change type is resolved when the change is built (or decoded) and
/// stored; it is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ChangeRecord")]
pub struct Change {
    pub(crate) field: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) old_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) new_value: Option<Value>,

    pub(crate) change_type: ChangeType,
}

/// Wire form of a change, where `changeType` may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeRecord {
    field: String,
    #[serde(default)]
    old_value: Option<Value>,
    #[serde(default)]
    new_value: Option<Value>,
    #[serde(default)]
    change_type: Option<ChangeType>,
}

impl ChangeRecord {
    pub(crate) fn into_unchecked(self) -> Change {
        Change::resolved(self.field, self.old_value, self.new_value, self.change_type)
    }
}

impl TryFrom<ChangeRecord> for Change {
    type Error = ValidationErrors;

    fn try_from(record: ChangeRecord) -> Result<Self, Self::Error> {
        let change = record.into_unchecked();
        change.validate()?;
        Ok(change)
    }
}

impl Change {
    /// Assembles a change and resolves its type. Field emptiness is checked
    /// by the callers (builder or [`Validate`]).
    pub(crate) fn resolved(
        field: String,
        old_value: Option<Value>,
        new_value: Option<Value>,
        explicit: Option<ChangeType>,
    ) -> Self {
        let old_value = present(old_value);
        let new_value = present(new_value);
        let change_type = infer_change_type(old_value.as_ref(), new_value.as_ref(), explicit);
        Self {
            field,
            old_value,
            new_value,
            change_type,
        }
    }

    /// Dot-notation path of the changed field, e.g. `address.city`.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Value before the change; `None` if the field did not exist.
    #[must_use]
    pub const fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    /// Value after the change; `None` if the field no longer exists.
    #[must_use]
    pub const fn new_value(&self) -> Option<&Value> {
        self.new_value.as_ref()
    }

    /// The stored change type.
    #[must_use]
    pub const fn change_type(&self) -> ChangeType {
        self.change_type
    }
}

impl Validate for Change {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_non_empty(&mut errors, "field", &self.field);
        errors.finish()
    }
}
