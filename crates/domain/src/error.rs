//! Domain error types

use thiserror::Error;

/// Errors produced by the pure domain rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A field failed validation before any write was attempted
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// A state transition violates the lifecycle rules
    #[error("{0}")]
    InvalidTransition(String),

    /// The requested state is not a member of the lifecycle enumeration
    #[error("{0} is not a valid drone state")]
    InvalidState(String),
}

impl DomainError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}
