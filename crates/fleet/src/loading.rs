//! Medication load coordinator
//!
//! Executes the transactional "load medications onto drone" workflow:
//! precondition checks, the LOADING transition through the state machine,
//! and the audit log, committed all-or-nothing. In strict mode the
//! coordinator additionally requires every code to resolve in the catalog
//! and the total weight to stay within the drone's limit; the permissive
//! default matches the reference behavior.

use crate::error::Result;
use skymed_domain::{
    state_machine, validation, DomainError, DroneMedicationLog, DroneState, LOW_BATTERY_THRESHOLD,
};
use skymed_store::{FleetStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info};

/// Coordinator for the atomic medication-load workflow
pub struct LoadCoordinator {
    store: Arc<FleetStore>,
    strict: bool,
}

impl LoadCoordinator {
    /// Create a coordinator; `strict` enables catalog and weight-limit
    /// enforcement
    pub fn new(store: Arc<FleetStore>, strict: bool) -> Self {
        Self { store, strict }
    }

    /// Load the given medications onto a drone
    ///
    /// Preconditions: a non-empty, well-formed code list; the drone exists;
    /// its battery is at or above the low threshold. The LOADING transition
    /// and the audit record commit in one scoped transaction; a losing
    /// concurrent writer observes a conflict and must retry the whole
    /// operation.
    pub fn load_medications(
        &self,
        drone_id: &str,
        medication_codes: &[String],
    ) -> Result<DroneMedicationLog> {
        if medication_codes.is_empty() {
            return Err(DomainError::validation(
                "medicationCodes",
                "Medication codes must be a non-empty array",
            )
            .into());
        }
        for code in medication_codes {
            validation::validate_medication_code(code)?;
        }

        let drone = self.store.get_drone(drone_id)?;

        if drone.battery_capacity < LOW_BATTERY_THRESHOLD {
            return Err(DomainError::InvalidTransition(
                "Drone battery too low to load medications".to_string(),
            )
            .into());
        }

        if self.strict {
            self.enforce_catalog(&drone.drone_id, drone.weight_limit, medication_codes)?;
        }

        let outcome = state_machine::transition(&drone, DroneState::Loading)?;
        debug!(drone_id = %drone.drone_id, "Transitioning drone to LOADING");

        let (_, log) = self.store.commit_load(&outcome.drone, medication_codes)?;

        info!(
            drone_id = %log.drone_id,
            count = log.medication_codes.len(),
            "Medications loaded"
        );
        Ok(log)
    }

    fn enforce_catalog(
        &self,
        drone_id: &str,
        weight_limit: u32,
        codes: &[String],
    ) -> Result<()> {
        let medications = self.store.get_medications(codes)?;

        if medications.len() != codes.len() {
            let missing = codes
                .iter()
                .find(|c| !medications.iter().any(|m| &m.code == *c))
                .cloned()
                .unwrap_or_default();
            return Err(StoreError::MedicationNotFound { code: missing }.into());
        }

        let total_weight: u32 = codes
            .iter()
            .filter_map(|c| medications.iter().find(|m| &m.code == c))
            .map(|m| m.weight)
            .sum();
        if total_weight > weight_limit {
            debug!(
                drone_id = %drone_id,
                total_weight,
                weight_limit,
                "Load rejected: over weight limit"
            );
            return Err(DomainError::validation(
                "medicationCodes",
                "Medications exceed drone weight limit",
            )
            .into());
        }

        Ok(())
    }
}
