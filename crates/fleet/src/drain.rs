//! Battery drain simulator
//!
//! One invocation ages every in-motion drone by one simulation tick:
//! draw a drain amount, evaluate the safety thresholds, then commit the
//! drone's update, the hazard record (when a threshold fired) and the
//! battery reading in one scoped transaction. Each drone's tick is its own
//! atomic unit; a failure on one drone rolls that drone back, lands in the
//! cycle report and never aborts the batch.

use crate::error::{FleetError, Result};
use serde::Serialize;
use skymed_domain::{evaluate_drain, Drone, DrainRng};
use skymed_store::FleetStore;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// One drone successfully aged by a tick
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainUpdate {
    /// Drone identifier
    pub drone_id: String,
    /// Battery level after the tick
    pub new_battery_level: u8,
}

/// One drone the tick could not process
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainFailure {
    /// Drone identifier
    pub drone_id: String,
    /// Why processing failed
    pub error: String,
}

/// Summary of one drain cycle
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    /// Drones aged this cycle
    pub updated: Vec<DrainUpdate>,
    /// Drones skipped because their update failed
    pub failures: Vec<DrainFailure>,
}

/// Periodic battery-drain process
///
/// The randomness source is injected so tests can fix the drain sequence;
/// production wires in [`skymed_domain::EntropyDrain`].
pub struct DrainSimulator {
    store: Arc<FleetStore>,
    rng: Mutex<Box<dyn DrainRng>>,
}

impl DrainSimulator {
    /// Create a simulator over the given store and drain source
    pub fn new(store: Arc<FleetStore>, rng: Box<dyn DrainRng>) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    /// Run one simulation tick over every in-motion drone
    ///
    /// Safe to invoke repeatedly; each call advances state independently.
    /// Returns an error only when the batch itself cannot start (the
    /// enumeration fails); per-drone failures land in the report.
    pub fn run_tick(&self) -> Result<DrainReport> {
        let drones = self.store.drones_in_motion()?;
        if drones.is_empty() {
            debug!("No drones in motion");
            return Ok(DrainReport::default());
        }
        let report = self.run_over(&drones);
        info!(
            updated = report.updated.len(),
            failures = report.failures.len(),
            "Battery drain cycle complete"
        );
        Ok(report)
    }

    fn run_over(&self, drones: &[Drone]) -> DrainReport {
        let mut report = DrainReport::default();
        for drone in drones {
            match self.process(drone) {
                Ok(update) => report.updated.push(update),
                Err(e) => {
                    warn!(drone_id = %drone.drone_id, error = %e, "Drain tick failed for drone");
                    report.failures.push(DrainFailure {
                        drone_id: drone.drone_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    fn process(&self, drone: &Drone) -> std::result::Result<DrainUpdate, FleetError> {
        let amount = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| skymed_store::StoreError::Unavailable("drain rng poisoned".into()))?;
            rng.drain_amount()
        };

        let outcome = evaluate_drain(drone, amount);

        if let Some(error_type) = outcome.error {
            warn!(
                drone_id = %drone.drone_id,
                battery = outcome.new_battery,
                state = %outcome.new_state,
                error_type = %error_type,
                "Drone crossed battery threshold"
            );
        }

        let mut updated = drone.clone();
        updated.battery_capacity = outcome.new_battery;
        updated.state = outcome.new_state;
        updated.is_emergency_return = outcome.is_emergency_return;

        // The scoped transaction is the atomic unit: a concurrent writer
        // that committed first surfaces as a conflict, the record and both
        // logs roll back together, and the drone is retried next tick.
        let (updated, _) = self.store.commit_drain(&updated, outcome.error)?;

        Ok(DrainUpdate {
            drone_id: updated.drone_id,
            new_battery_level: updated.battery_capacity,
        })
    }
}
