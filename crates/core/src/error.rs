//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Persistence concerns belong to `contaerp-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A single value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record failed one or more checks. Messages are meant for display.
    #[error("validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. the record is referenced elsewhere).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Human-readable messages carried by this error, one per failed check.
    pub fn messages(&self) -> Vec<String> {
        match self {
            DomainError::Invalid(msgs) => msgs.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_joins_messages_for_display() {
        let err = DomainError::Invalid(vec!["bad code".into(), "empty name".into()]);
        assert_eq!(err.to_string(), "validation failed: bad code; empty name");
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn single_errors_expose_one_message() {
        let err = DomainError::conflict("invoice already posted");
        assert_eq!(err.messages(), vec!["conflict: invoice already posted".to_string()]);
    }
}
