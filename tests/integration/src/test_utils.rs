//! Shared fixtures for the end-to-end scenarios

use skymed_domain::{DroneState, FixedDrain};
use skymed_fleet::{DrainSimulator, FleetReporter, FleetService, LoadCoordinator};
use skymed_store::FleetStore;
use std::sync::Arc;

/// A complete stack over one in-memory store
pub struct TestFleet {
    pub store: Arc<FleetStore>,
    pub service: FleetService,
    pub loader: LoadCoordinator,
    pub reporter: FleetReporter,
}

impl TestFleet {
    /// Fresh in-memory fleet with permissive loading
    pub fn new() -> Self {
        let store = Arc::new(FleetStore::in_memory().unwrap());
        Self {
            service: FleetService::new(store.clone()),
            loader: LoadCoordinator::new(store.clone(), false),
            reporter: FleetReporter::new(store.clone()),
            store,
        }
    }

    /// Fresh in-memory fleet with catalog and weight enforcement on
    pub fn strict() -> Self {
        let mut fleet = Self::new();
        fleet.loader = LoadCoordinator::new(fleet.store.clone(), true);
        fleet
    }

    /// Register a drone and force it into the given battery level and state
    pub fn drone_at(&self, battery: u8, state: DroneState) -> String {
        let mut drone = self
            .service
            .register_drone("Lightweight-X", 300, 100)
            .unwrap();
        drone.battery_capacity = battery;
        drone.state = state;
        let drone = self.store.update_drone(&drone).unwrap();
        drone.drone_id
    }

    /// A simulator over this fleet's store with a scripted drain sequence
    pub fn simulator(&self, drains: Vec<u8>) -> DrainSimulator {
        DrainSimulator::new(self.store.clone(), Box::new(FixedDrain::new(drains)))
    }
}

impl Default for TestFleet {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned code list from string literals
pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
