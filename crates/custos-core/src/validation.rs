//! Validation framework shared by the audit model and its builders.
//!
//! Builders report the first violated constraint as a single
//! [`ValidationError`]. Already-built values (for example, events that came
//! off the wire) can be checked through the [`Validate`] trait, which reports
//! every violation it finds in a [`ValidationErrors`] collection.

use std::fmt;

/// A constraint violated while constructing or checking an audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path that failed validation (e.g. `resource.parentResource.id`).
    pub field: String,
    /// A human-readable description of the failure.
    pub message: String,
    /// The kind of validation that failed.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use custos_core::{ValidationError, ValidationErrorKind};
    ///
    /// let error = ValidationError::new(
    ///     "changes[0].field",
    ///     "field path must not be empty",
    ///     ValidationErrorKind::Empty,
    /// );
    /// assert_eq!(error.field, "changes[0].field");
    /// ```
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }

    /// Creates a validation error for a mandatory field that was never set.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("'{field}' is required but was not provided"),
            field,
            kind: ValidationErrorKind::Required,
        }
    }

    /// Creates a validation error for a mandatory string that was set but empty.
    pub fn empty(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("'{field}' must not be empty"),
            field,
            kind: ValidationErrorKind::Empty,
        }
    }

    /// Creates a validation error for a constraint violation.
    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: ValidationErrorKind::Constraint,
        }
    }

    /// Returns a copy of this error with `prefix` prepended to the field path.
    #[must_use]
    pub fn nested(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The category of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// A mandatory field was not provided.
    Required,
    /// A mandatory string was provided but empty.
    Empty,
    /// Some other structural constraint was violated.
    Constraint,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Empty => write!(f, "empty"),
            Self::Constraint => write!(f, "constraint"),
        }
    }
}

/// A collection of validation errors, in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty validation errors collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validation error to the collection.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of validation errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the validation errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Returns the first error found, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Converts to a Result, returning `Ok(())` if no errors, or `Err` with the first error.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` if any errors exist in the collection.
    pub fn into_result(self) -> Result<(), ValidationError> {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// Merges another `ValidationErrors` into this one, prefixing each field path.
    pub fn merge_nested(&mut self, prefix: &str, other: Self) {
        self.errors
            .extend(other.errors.into_iter().map(|e| e.nested(prefix)));
    }

    /// Finishes a validation pass: `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = ValidationError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "no validation errors")
        } else if self.errors.len() == 1 {
            write!(f, "{}", self.errors[0])
        } else {
            writeln!(f, "{} validation errors:", self.errors.len())?;
            for error in &self.errors {
                writeln!(f, "  - {error}")?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for already-built values that can re-check their own invariants.
///
/// Builders enforce these invariants at construction time; `Validate` exists
/// for values that arrive by another route, such as deserialization.
pub trait Validate {
    /// Validates this instance and returns every violation found.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` containing all validation failures found.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Returns true if this instance is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Records an [`ValidationError::empty`] for `field` when `value` is empty.
pub(crate) fn require_non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(ValidationError::empty(field));
    }
}
