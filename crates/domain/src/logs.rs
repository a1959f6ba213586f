//! Append-only audit records
//!
//! BatteryLog, ErrorLog and DroneMedicationLog rows are written once and
//! never mutated or deleted; together they form the fleet's history.

use crate::drone::DroneState;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hazard classes recorded when a drain tick forces a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Battery dropped below the low threshold while delivering
    LowBattery,
    /// Battery dropped below the critical threshold while in motion
    Failed,
}

impl ErrorType {
    /// Wire representation, matching the persisted enumeration values
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::LowBattery => "LOW_BATTERY",
            ErrorType::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW_BATTERY" => Ok(ErrorType::LowBattery),
            "FAILED" => Ok(ErrorType::Failed),
            other => Err(DomainError::InvalidState(other.to_string())),
        }
    }
}

/// One battery reading, recorded per drain tick per in-motion drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryLog {
    /// Row identifier assigned by the store
    pub id: i64,
    /// Drone this reading belongs to
    pub drone_id: String,
    /// Battery level after the tick, 0-100
    pub battery_level: u8,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
}

/// One hazard event, recorded when a drone crosses a safety threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    /// Row identifier assigned by the store
    pub id: i64,
    /// Drone the hazard applies to
    pub drone_id: String,
    /// Hazard class
    pub error_type: ErrorType,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
}

/// Audit record of one medication load, written atomically with the drone's
/// transition to LOADING
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneMedicationLog {
    /// Row identifier assigned by the store
    pub id: i64,
    /// Drone that was loaded
    pub drone_id: String,
    /// Medication codes in the order they were supplied
    pub medication_codes: Vec<String>,
    /// Drone state snapshot after the load transition
    pub drone_state: DroneState,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
}
