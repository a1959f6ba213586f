//! Battery drain evaluation
//!
//! Pure threshold rules for one simulation tick over one drone. The drain
//! amount comes from an injectable [`DrainRng`] so tests can fix the
//! sequence and assert exact threshold crossings; production uses the
//! entropy-seeded source.

use crate::drone::{Drone, DroneState};
use crate::logs::ErrorType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest battery percentage drained in one tick
pub const DRAIN_MIN: u8 = 5;
/// Largest battery percentage drained in one tick
pub const DRAIN_MAX: u8 = 15;
/// Below this level a delivering drone is recalled and loading is refused
pub const LOW_BATTERY_THRESHOLD: u8 = 25;
/// Below this level an in-motion drone fails outright
pub const CRITICAL_BATTERY_THRESHOLD: u8 = 5;

/// Source of per-tick drain amounts
pub trait DrainRng: Send {
    /// Next drain amount, always within `[DRAIN_MIN, DRAIN_MAX]`
    fn drain_amount(&mut self) -> u8;
}

/// Production drain source, uniformly random in `[DRAIN_MIN, DRAIN_MAX]`
pub struct EntropyDrain {
    rng: StdRng,
}

impl EntropyDrain {
    /// Create an entropy-seeded drain source
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a seeded drain source (reproducible, still uniform)
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropyDrain {
    fn default() -> Self {
        Self::new()
    }
}

impl DrainRng for EntropyDrain {
    fn drain_amount(&mut self) -> u8 {
        self.rng.gen_range(DRAIN_MIN..=DRAIN_MAX)
    }
}

/// Deterministic drain source for tests; repeats its last amount when the
/// supplied sequence runs out
pub struct FixedDrain {
    amounts: Vec<u8>,
    next: usize,
}

impl FixedDrain {
    /// Create a fixed sequence of drain amounts
    pub fn new(amounts: Vec<u8>) -> Self {
        assert!(!amounts.is_empty(), "FixedDrain needs at least one amount");
        Self { amounts, next: 0 }
    }
}

impl DrainRng for FixedDrain {
    fn drain_amount(&mut self) -> u8 {
        let amount = self.amounts[self.next.min(self.amounts.len() - 1)];
        self.next += 1;
        amount
    }
}

/// Outcome of evaluating one drain tick against one drone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Battery level after the tick, clamped at zero
    pub new_battery: u8,
    /// Lifecycle state after threshold evaluation
    pub new_state: DroneState,
    /// Emergency flag after threshold evaluation
    pub is_emergency_return: bool,
    /// Hazard record to append, when a threshold fired
    pub error: Option<ErrorType>,
}

/// Apply one drain tick's thresholds to an in-motion drone
///
/// The two threshold branches are mutually exclusive per tick: a drone
/// crossing straight from a healthy level to below the critical threshold
/// takes the FAILED branch only.
pub fn evaluate_drain(drone: &Drone, amount: u8) -> DrainOutcome {
    let new_battery = drone.battery_capacity.saturating_sub(amount);

    if new_battery < CRITICAL_BATTERY_THRESHOLD && drone.state.is_in_motion() {
        return DrainOutcome {
            new_battery,
            new_state: DroneState::Failed,
            is_emergency_return: true,
            error: Some(ErrorType::Failed),
        };
    }

    if new_battery < LOW_BATTERY_THRESHOLD && drone.state == DroneState::Delivering {
        return DrainOutcome {
            new_battery,
            new_state: DroneState::Returning,
            is_emergency_return: true,
            error: Some(ErrorType::LowBattery),
        };
    }

    DrainOutcome {
        new_battery,
        new_state: drone.state,
        is_emergency_return: drone.is_emergency_return,
        error: None,
    }
}
