//! Drone record and lifecycle state enumeration

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle states of a delivery drone
///
/// `Failed` is terminal: once a drone reaches it, no further transitions are
/// accepted until external remediation outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneState {
    /// Parked and available
    Idle,
    /// Medications are being loaded
    Loading,
    /// En route to the delivery target
    Delivering,
    /// Payload dropped off, not yet heading back
    Delivered,
    /// Heading back to base
    Returning,
    /// Out of service (battery exhaustion or administrative override)
    Failed,
}

impl DroneState {
    /// Wire representation, matching the persisted enumeration values
    pub fn as_str(&self) -> &'static str {
        match self {
            DroneState::Idle => "IDLE",
            DroneState::Loading => "LOADING",
            DroneState::Delivering => "DELIVERING",
            DroneState::Delivered => "DELIVERED",
            DroneState::Returning => "RETURNING",
            DroneState::Failed => "FAILED",
        }
    }

    /// A drone is in motion while delivering or returning; only in-motion
    /// drones drain battery
    pub fn is_in_motion(&self) -> bool {
        matches!(self, DroneState::Delivering | DroneState::Returning)
    }

    /// Whether this state accepts no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, DroneState::Failed)
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DroneState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(DroneState::Idle),
            "LOADING" => Ok(DroneState::Loading),
            "DELIVERING" => Ok(DroneState::Delivering),
            "DELIVERED" => Ok(DroneState::Delivered),
            "RETURNING" => Ok(DroneState::Returning),
            "FAILED" => Ok(DroneState::Failed),
            other => Err(DomainError::InvalidState(other.to_string())),
        }
    }
}

/// A registered delivery drone
///
/// Owned exclusively by the fleet store; `state`, `battery_capacity` and
/// `is_emergency_return` are mutated only through the state machine's
/// transition function or the drain evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    /// Unique sequential identifier, format `D###`
    pub drone_id: String,
    /// Free-text model designation
    pub model: String,
    /// Maximum payload weight in grams
    pub weight_limit: u32,
    /// Battery level, 0-100 percent
    pub battery_capacity: u8,
    /// Current lifecycle state
    pub state: DroneState,
    /// Set when a safety rule forced the drone into RETURNING or FAILED
    pub is_emergency_return: bool,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
    /// Last modification time, Unix milliseconds
    pub updated_at: u64,
    /// Optimistic concurrency token, incremented by the store on every write
    #[serde(default)]
    pub version: u64,
}

/// Format a sequential drone number as a `D###` identifier
///
/// Numbers beyond 999 widen naturally (`D1000`), matching the zero-padded
/// minimum width of three digits.
pub fn format_drone_id(seq: u32) -> String {
    format!("D{:03}", seq)
}
