//! Evaluation error types shared by the service, the stores and the HTTP layer.

use thiserror::Error;

/// Errors produced while generating tasks, recording evaluations or
/// aggregating summaries.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// A request field is malformed or out of range.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A user tried to evaluate themself.
    #[error("a user cannot evaluate themself")]
    InvalidSubject,

    /// A referenced user or criterion does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    /// The backing store failed (I/O, serialization, poisoned lock).
    #[error("storage error: {0}")]
    Storage(String),
}

impl EvaluationError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        EvaluationError::Storage(err.to_string())
    }

    /// Returns `true` if the error was caused by the request rather than by
    /// the infrastructure. Client errors are surfaced verbatim.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EvaluationError::Storage(_))
    }
}

/// Result alias used throughout the evaluation core.
pub type Result<T> = std::result::Result<T, EvaluationError>;
