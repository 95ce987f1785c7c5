use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRule {
    MissingRequired,
    OutOfRange,
    InvalidEnum,
}

impl fmt::Display for SchemaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingRequired => "missing-required",
            Self::OutOfRange => "out-of-range",
            Self::InvalidEnum => "invalid-enum",
        })
    }
}

/// A candidate answer or plan failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation on `{field}` ({rule}): {detail}")]
pub struct SchemaViolation {
    pub field: String,
    pub rule: SchemaRule,
    pub detail: String,
}

impl SchemaViolation {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: SchemaRule::MissingRequired,
            detail: "required field is empty".to_string(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: SchemaRule::OutOfRange,
            detail: detail.into(),
        }
    }

    pub fn invalid_enum(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: SchemaRule::InvalidEnum,
            detail: detail.into(),
        }
    }
}

/// The knowledge backend failed, timed out, or returned unusable content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("knowledge backend `{backend}` unavailable: {reason}")]
pub struct BackendUnavailable {
    pub backend: String,
    pub reason: String,
}

impl BackendUnavailable {
    pub fn new(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TutorError {
    /// Caller data was malformed or out of range. Never retryable.
    #[error("invalid input `{parameter}`: {reason}")]
    InvalidInput { parameter: String, reason: String },
    /// A composed answer failed validation. Indicates a defect, not a caller error.
    #[error("composition failed: {0}")]
    Composition(#[source] SchemaViolation),
}

impl TutorError {
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Caller-supplied data that fails the schema is the caller's problem.
    pub fn rejected(violation: SchemaViolation) -> Self {
        Self::InvalidInput {
            reason: format!("{} ({})", violation.detail, violation.rule),
            parameter: violation.field,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
