//! SkyMed domain rules
//!
//! Pure lifecycle logic for the medical delivery drone fleet:
//! - Drone records and the six-state lifecycle enumeration
//! - The state machine that is the sole authority for legal transitions
//! - Battery drain evaluation with an injectable randomness source
//! - Field validation decoupled from any storage schema
//!
//! Nothing in this crate performs I/O; persistence lives in `skymed-store`
//! and orchestration in `skymed-fleet`.

#![warn(missing_docs)]

pub mod drain;
pub mod drone;
pub mod error;
pub mod logging;
pub mod logs;
pub mod medication;
pub mod state_machine;
pub mod validation;

pub use drain::{
    evaluate_drain, DrainOutcome, DrainRng, EntropyDrain, FixedDrain, CRITICAL_BATTERY_THRESHOLD,
    DRAIN_MAX, DRAIN_MIN, LOW_BATTERY_THRESHOLD,
};
pub use drone::{format_drone_id, Drone, DroneState};
pub use error::DomainError;
pub use logs::{BatteryLog, DroneMedicationLog, ErrorLog, ErrorType};
pub use medication::Medication;
pub use state_machine::{transition, ForcedTransition, TransitionOutcome};
