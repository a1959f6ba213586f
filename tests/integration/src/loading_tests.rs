//! Medication loading exercised against the full stack

use crate::test_utils::{codes, TestFleet};
use skymed_domain::{DomainError, DroneState};
use skymed_fleet::FleetError;
use skymed_store::StoreError;

#[test]
fn idle_drone_loads_medications_and_logs_the_manifest() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(80, DroneState::Idle);

    let log = fleet
        .loader
        .load_medications(&id, &codes(&["MED1", "MED2"]))
        .unwrap();
    assert_eq!(log.drone_id, id);
    assert_eq!(log.medication_codes, codes(&["MED1", "MED2"]));
    assert_eq!(log.drone_state, DroneState::Loading);

    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.state, DroneState::Loading);

    let logs = fleet.store.medication_logs_for_drone(&id).unwrap();
    assert_eq!(logs.len(), 1);
}

#[test]
fn load_is_all_or_nothing_when_the_drone_cannot_transition() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(10, DroneState::Idle);

    let err = fleet
        .loader
        .load_medications(&id, &codes(&["MED1"]))
        .unwrap_err();
    assert!(matches!(err, FleetError::Domain(DomainError::InvalidTransition(_))));

    // Neither the state nor the audit trail moved.
    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Idle);
    assert!(fleet.store.medication_logs_for_drone(&id).unwrap().is_empty());
}

#[test]
fn racing_load_against_a_drain_tick_leaves_one_winner() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(80, DroneState::Delivering);

    // The drain tick commits first and bumps the drone's version.
    let stale = fleet.store.get_drone(&id).unwrap();
    fleet.simulator(vec![5]).run_tick().unwrap();

    // A load built from the pre-tick snapshot must lose.
    let mut racer = stale;
    racer.state = DroneState::Loading;
    let err = fleet.store.commit_load(&racer, &codes(&["MED1"])).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.state, DroneState::Delivering);
    assert_eq!(drone.battery_capacity, 75);
    assert!(fleet.store.medication_logs_for_drone(&id).unwrap().is_empty());
}

#[test]
fn strict_fleet_checks_catalog_and_weight_end_to_end() {
    let fleet = TestFleet::strict();
    let id = fleet.drone_at(80, DroneState::Idle);
    fleet.service.add_medication("MED1", "Aspirin", 120).unwrap();
    fleet.service.add_medication("MED2", "Ibuprofen", 100).unwrap();

    let err = fleet
        .loader
        .load_medications(&id, &codes(&["MED1", "GHOST"]))
        .unwrap_err();
    assert!(matches!(
        err,
        FleetError::Store(StoreError::MedicationNotFound { code }) if code == "GHOST"
    ));

    // 120 + 100 fits the 300 g limit.
    let log = fleet
        .loader
        .load_medications(&id, &codes(&["MED1", "MED2"]))
        .unwrap();
    assert_eq!(log.medication_codes.len(), 2);
}

#[test]
fn reloading_a_loading_drone_is_allowed_and_appends_a_second_log() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(80, DroneState::Idle);

    fleet.loader.load_medications(&id, &codes(&["MED1"])).unwrap();
    fleet.loader.load_medications(&id, &codes(&["MED2"])).unwrap();

    let logs = fleet.store.medication_logs_for_drone(&id).unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Loading);
}
