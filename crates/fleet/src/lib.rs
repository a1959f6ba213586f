//! SkyMed fleet operations
//!
//! Orchestration over the domain rules and the fleet store:
//! - [`DrainSimulator`] runs one battery-drain tick over every in-motion
//!   drone with per-drone failure isolation
//! - [`LoadCoordinator`] executes the atomic medication-load workflow
//! - [`FleetService`] fronts registration, state changes and catalog upkeep
//! - [`FleetReporter`] answers the read-only dashboard queries

#![warn(missing_docs)]

pub mod drain;
pub mod error;
pub mod loading;
pub mod report;
pub mod service;

pub use drain::{DrainFailure, DrainReport, DrainSimulator, DrainUpdate};
pub use error::{FleetError, Result};
pub use loading::LoadCoordinator;
pub use report::{BatteryLogView, DroneReportRow, FleetReporter};
pub use service::FleetService;
