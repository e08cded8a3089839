//! Error types for encoding and decoding audit events.

use custos_core::ValidationErrors;
use serde_json::error::Category;
use thiserror::Error;

/// Result type alias using [`CodecError`] as the error type.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while turning wire input into an [`AuditEvent`](custos_core::AuditEvent).
///
/// Decoding is all-or-nothing: no partially decoded event is ever returned.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The input is not well-formed JSON (syntax error, truncation, bad UTF-8).
    #[error("input is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The JSON is well-formed but does not have the audit event shape:
    /// a mandatory field is missing, a value has the wrong type, or an
    /// enumerated value is unknown.
    #[error("document does not match the audit event schema: {0}")]
    Shape(#[source] serde_json::Error),

    /// The document has the right shape but violates an event invariant,
    /// such as an empty resource id.
    #[error("decoded audit event is invalid: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl DecodeError {
    /// Short label for the error category, suitable for log fields.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::Shape(_) => "shape",
            Self::Invalid(_) => "invalid",
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        if err.classify() == Category::Data {
            Self::Shape(err)
        } else {
            Self::Malformed(err)
        }
    }
}

/// Errors that can occur in codec operations.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The event could not be rendered as JSON.
    #[error("failed to encode audit event: {0}")]
    Encode(#[source] serde_json::Error),

    /// Wire input could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
