//! End-to-end scenarios for the fleet workspace
//!
//! This test suite validates:
//! - The full drone lifecycle through the state machine and store
//! - Battery drain cycles with forced recalls and groundings
//! - The atomic medication-load workflow under contention
//! - Fleet reports and audit trails built from the logged history

pub mod test_utils;

#[cfg(test)]
mod lifecycle_tests;

#[cfg(test)]
mod drain_cycle_tests;

#[cfg(test)]
mod loading_tests;

#[cfg(test)]
mod fleet_report_tests;
