//! Fleet service facade
//!
//! Registration, state changes and catalog upkeep. Every lifecycle mutation
//! funnels through the state machine's transition function; the one
//! exception is [`FleetService::mark_failed`], the administrative override
//! that grounds a drone unconditionally.

use crate::error::Result;
use skymed_domain::{state_machine, validation, Drone, DroneState, Medication};
use skymed_store::FleetStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Thin facade over the store and the domain rules
pub struct FleetService {
    store: Arc<FleetStore>,
}

impl FleetService {
    /// Create a service over the given store handle
    pub fn new(store: Arc<FleetStore>) -> Self {
        Self { store }
    }

    /// Register a new drone, validating all fields before the write
    pub fn register_drone(
        &self,
        model: &str,
        weight_limit: u32,
        battery_capacity: i64,
    ) -> Result<Drone> {
        validation::validate_model(model)?;
        validation::validate_weight_limit(weight_limit)?;
        validation::validate_battery_capacity(battery_capacity)?;

        let drone = self
            .store
            .register_drone(model.trim(), weight_limit, battery_capacity as u8)?;
        info!(drone_id = %drone.drone_id, model = %drone.model, "Drone registered");
        Ok(drone)
    }

    /// Fetch one drone
    pub fn get_drone(&self, drone_id: &str) -> Result<Drone> {
        Ok(self.store.get_drone(drone_id)?)
    }

    /// List the whole fleet
    pub fn list_drones(&self) -> Result<Vec<Drone>> {
        Ok(self.store.list_drones()?)
    }

    /// Apply a requested state change through the state machine
    ///
    /// Safety rules may override the request (a forced transition); the
    /// persisted drone reflects the rule outcome, not necessarily the
    /// request.
    pub fn request_state_change(&self, drone_id: &str, requested: DroneState) -> Result<Drone> {
        let drone = self.store.get_drone(drone_id)?;
        let outcome = state_machine::transition(&drone, requested)?;

        if let Some(forced) = outcome.forced {
            warn!(
                drone_id = %drone_id,
                requested = %requested,
                applied = %outcome.drone.state,
                ?forced,
                "Safety rule overrode requested state"
            );
        }

        Ok(self.store.update_drone(&outcome.drone)?)
    }

    /// Administrative override: ground a drone unconditionally
    pub fn mark_failed(&self, drone_id: &str) -> Result<Drone> {
        let mut drone = self.store.get_drone(drone_id)?;
        drone.state = DroneState::Failed;
        let updated = self.store.update_drone(&drone)?;
        warn!(drone_id = %drone_id, "Drone administratively marked FAILED");
        Ok(updated)
    }

    /// Add a medication to the catalog, validating the schema patterns
    pub fn add_medication(&self, code: &str, name: &str, weight: u32) -> Result<Medication> {
        validation::validate_medication_code(code)?;
        validation::validate_medication_name(name)?;
        Ok(self.store.add_medication(code, name, weight)?)
    }

    /// List the medication catalog
    pub fn list_medications(&self) -> Result<Vec<Medication>> {
        Ok(self.store.list_medications()?)
    }
}
