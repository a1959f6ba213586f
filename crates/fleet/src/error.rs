//! Fleet operation errors

use skymed_domain::DomainError;
use skymed_store::StoreError;
use thiserror::Error;

/// Umbrella error for fleet operations
///
/// The boundary layer maps these onto client responses: validation and
/// invalid-transition errors are client-correctable, conflicts mean "retry
/// the whole operation", unavailability is a generic retryable failure.
#[derive(Debug, Error)]
pub enum FleetError {
    /// A domain rule rejected the operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FleetError {
    /// Whether the caller should retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FleetError::Store(StoreError::Conflict { .. })
                | FleetError::Store(StoreError::Unavailable(_))
        )
    }
}

/// Convenience result alias for fleet operations
pub type Result<T> = std::result::Result<T, FleetError>;
