//! Read-only fleet queries
//!
//! Aggregations for dashboards and reports; nothing here mutates state.

use crate::error::Result;
use serde::Serialize;
use skymed_domain::{DroneState, ErrorLog};
use skymed_store::FleetStore;
use std::collections::HashMap;
use std::sync::Arc;

/// One row of the fleet report
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DroneReportRow {
    /// Drone identifier
    pub drone_id: String,
    /// Model designation
    pub model: String,
    /// Payload limit in grams
    pub weight_limit: u32,
    /// Latest logged battery level in the requested range, if any
    pub battery_capacity: Option<u8>,
    /// Current lifecycle state
    pub state: DroneState,
}

/// A battery reading joined with its drone's identity
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatteryLogView {
    /// Row identifier
    pub id: i64,
    /// Drone identifier
    pub drone_id: String,
    /// Model designation of the drone
    pub model: String,
    /// Logged battery level
    pub battery_level: u8,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
}

/// Read-only aggregation service over the fleet store
pub struct FleetReporter {
    store: Arc<FleetStore>,
}

impl FleetReporter {
    /// Create a reporter over the given store handle
    pub fn new(store: Arc<FleetStore>) -> Self {
        Self { store }
    }

    /// One report row per drone: identity plus the latest logged battery
    /// level, optionally restricted to a time range
    ///
    /// Drones with no battery log in range report `None` for the level.
    pub fn fleet_report(&self, range: Option<(u64, u64)>) -> Result<Vec<DroneReportRow>> {
        let drones = self.store.list_drones()?;
        let latest: HashMap<String, u8> = self
            .store
            .latest_battery_levels(range)?
            .into_iter()
            .map(|l| (l.drone_id, l.battery_level))
            .collect();

        Ok(drones
            .into_iter()
            .map(|d| DroneReportRow {
                battery_capacity: latest.get(&d.drone_id).copied(),
                drone_id: d.drone_id,
                model: d.model,
                weight_limit: d.weight_limit,
                state: d.state,
            })
            .collect())
    }

    /// Battery readings in a time range, newest first, joined with drone
    /// identity
    pub fn battery_logs(&self, start_ms: u64, end_ms: u64) -> Result<Vec<BatteryLogView>> {
        let models: HashMap<String, String> = self
            .store
            .list_drones()?
            .into_iter()
            .map(|d| (d.drone_id, d.model))
            .collect();

        Ok(self
            .store
            .battery_logs_between(start_ms, end_ms)?
            .into_iter()
            .map(|log| BatteryLogView {
                model: models.get(&log.drone_id).cloned().unwrap_or_default(),
                id: log.id,
                drone_id: log.drone_id,
                battery_level: log.battery_level,
                created_at: log.created_at,
            })
            .collect())
    }

    /// All hazard records, newest first
    pub fn error_logs(&self) -> Result<Vec<ErrorLog>> {
        Ok(self.store.list_error_logs()?)
    }
}
