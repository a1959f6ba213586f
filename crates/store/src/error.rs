//! Store error types

use rusqlite::ffi::ErrorCode;
use thiserror::Error;

/// Errors that can occur in fleet store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No drone with the given identifier exists
    #[error("Drone not found: {drone_id}")]
    DroneNotFound {
        /// The identifier that failed to resolve
        drone_id: String,
    },

    /// One or more medication codes failed to resolve
    #[error("Medication not found: {code}")]
    MedicationNotFound {
        /// The code that failed to resolve
        code: String,
    },

    /// A medication with this code already exists
    #[error("Medication with this code already exists: {code}")]
    DuplicateMedicationCode {
        /// The conflicting code
        code: String,
    },

    /// A concurrent writer committed first; the caller should re-read and
    /// retry the whole operation
    #[error("Concurrent update conflict on drone {drone_id}")]
    Conflict {
        /// The contested drone record
        drone_id: String,
    },

    /// Transient connectivity or locking problem; retry with backoff
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A persisted value no longer parses as its domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// IO error while creating the database directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Busy/locked are the transient class; everything else is a hard
        // database error.
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) {
                return StoreError::Unavailable(err.to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Convenience result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
