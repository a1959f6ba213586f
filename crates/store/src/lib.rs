//! SkyMed fleet store
//!
//! SQLite-backed persistence for the five fleet record collections: drones,
//! battery logs, error logs, medications and medication-load logs. The store
//! is an explicitly constructed handle, opened at process start and passed to
//! every component; there is no process-wide cached connection.
//!
//! Concurrency contract: every drone read-modify-write goes through a
//! versioned update, so a stale writer observes a conflict instead of
//! silently overwriting. The medication-load workflow commits its two writes
//! inside one scoped transaction.

#![warn(missing_docs)]

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{FleetStore, LatestBattery};
