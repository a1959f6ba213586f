//! Drone lifecycle state machine
//!
//! `transition` is the sole authority for legal state changes. Safety rules
//! are evaluated in a fixed precedence order and may override the caller's
//! requested state (a forced transition). Callers receive the forced reason
//! so the drain simulator can persist the matching hazard record; the state
//! machine itself never writes logs.

use crate::drain::LOW_BATTERY_THRESHOLD;
use crate::drone::{Drone, DroneState};
use crate::error::DomainError;

/// Why a safety rule overrode the requested state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedTransition {
    /// Battery below the low threshold while delivering; drone recalled
    EmergencyReturn,
    /// Battery fully exhausted; drone grounded
    BatteryExhausted,
}

/// Result of a successful transition evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The drone with its new state applied (not yet persisted)
    pub drone: Drone,
    /// Present when a safety rule overrode the requested state
    pub forced: Option<ForcedTransition>,
}

/// Evaluate a requested state change against the lifecycle rules
///
/// Rules, in precedence order:
/// 1. A drone with an exhausted battery is forced to FAILED regardless of
///    the requested state.
/// 2. LOADING is rejected when the battery is below the low threshold or
///    the drone has already failed.
/// 3. FAILED is terminal; no other request is accepted on a failed drone.
/// 4. A delivering drone below the low threshold is recalled: forced to
///    RETURNING with the emergency flag set, overriding the request.
/// 5. Otherwise the requested state applies as-is. A fresh, non-forced
///    transition to IDLE or LOADING clears the emergency flag; the flag
///    persists through RETURNING and FAILED until the drone is reset.
///
/// The outcome is a single-drone update; no rule ever touches another
/// drone's record.
pub fn transition(drone: &Drone, requested: DroneState) -> Result<TransitionOutcome, DomainError> {
    // Rule 1: exhausted battery grounds the drone, idempotently.
    if drone.battery_capacity == 0 {
        let mut updated = drone.clone();
        updated.state = DroneState::Failed;
        return Ok(TransitionOutcome {
            drone: updated,
            forced: Some(ForcedTransition::BatteryExhausted),
        });
    }

    // Rule 2: loading requires a charged, operational drone.
    if requested == DroneState::Loading
        && (drone.battery_capacity < LOW_BATTERY_THRESHOLD || drone.state == DroneState::Failed)
    {
        return Err(DomainError::InvalidTransition(
            "Drone cannot be loaded.".to_string(),
        ));
    }

    // Rule 3: FAILED accepts no further transitions.
    if drone.state.is_terminal() {
        return Err(DomainError::InvalidTransition(format!(
            "Drone {} has failed and accepts no further transitions",
            drone.drone_id
        )));
    }

    // Rule 4: low battery mid-delivery triggers an emergency recall,
    // overriding whatever the caller asked for.
    if drone.battery_capacity < LOW_BATTERY_THRESHOLD && drone.state == DroneState::Delivering {
        let mut updated = drone.clone();
        updated.state = DroneState::Returning;
        updated.is_emergency_return = true;
        return Ok(TransitionOutcome {
            drone: updated,
            forced: Some(ForcedTransition::EmergencyReturn),
        });
    }

    // Rule 5: apply the request.
    let mut updated = drone.clone();
    updated.state = requested;
    if matches!(requested, DroneState::Idle | DroneState::Loading) {
        updated.is_emergency_return = false;
    }
    Ok(TransitionOutcome {
        drone: updated,
        forced: None,
    })
}
