//! Result of an audited action.

use serde::{Deserialize, Serialize};

/// Success or failure of an action, with optional error details and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub(crate) success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) duration_ms: Option<u64>,
}

impl Outcome {
    /// A successful outcome with no further detail.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            success: true,
            error_code: None,
            error_message: None,
            duration_ms: None,
        }
    }

    /// A failed outcome with an error code and message.
    #[must_use]
    pub fn failure(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
            duration_ms: None,
        }
    }

    /// Whether the action succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Machine-readable error code; meaningful only on failure.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Human-readable error message.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// How long the action took, in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcome() {
        let outcome = Outcome::failure("LOGIN_FAILED", "bad password");
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_code(), Some("LOGIN_FAILED"));
        assert_eq!(outcome.error_message(), Some("bad password"));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let result: Result<Outcome, _> =
            serde_json::from_str(r#"{"success":true,"durationMs":-5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_success_serializes_minimal() {
        let json = serde_json::to_string(&Outcome::success()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
