//! Drone lifecycle walked end to end through service, state machine and store

use crate::test_utils::TestFleet;
use skymed_domain::{DomainError, DroneState};
use skymed_fleet::FleetError;

#[test]
fn full_delivery_mission_round_trip() {
    let fleet = TestFleet::new();
    let drone = fleet.service.register_drone("Lightweight-X", 300, 80).unwrap();
    assert_eq!(drone.drone_id, "D001");
    assert_eq!(drone.state, DroneState::Idle);

    for next in [
        DroneState::Loading,
        DroneState::Delivering,
        DroneState::Delivered,
        DroneState::Returning,
        DroneState::Idle,
    ] {
        let updated = fleet.service.request_state_change("D001", next).unwrap();
        assert_eq!(updated.state, next);
    }

    let stored = fleet.store.get_drone("D001").unwrap();
    assert_eq!(stored.state, DroneState::Idle);
    assert!(!stored.is_emergency_return);
    // One version bump per persisted transition.
    assert_eq!(stored.version, 6);
}

#[test]
fn low_battery_drone_is_refused_loading_state() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(10, DroneState::Idle);

    let err = fleet
        .service
        .request_state_change(&id, DroneState::Loading)
        .unwrap_err();
    match err {
        FleetError::Domain(DomainError::InvalidTransition(message)) => {
            assert_eq!(message, "Drone cannot be loaded.");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Idle);
}

#[test]
fn failed_drone_accepts_no_further_transitions() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(50, DroneState::Returning);
    fleet.service.mark_failed(&id).unwrap();

    for requested in [
        DroneState::Idle,
        DroneState::Loading,
        DroneState::Delivering,
        DroneState::Returning,
    ] {
        let err = fleet.service.request_state_change(&id, requested).unwrap_err();
        assert!(
            matches!(err, FleetError::Domain(DomainError::InvalidTransition(_))),
            "{requested} should be refused on a failed drone"
        );
    }
    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Failed);
}

#[test]
fn delivering_below_threshold_is_recalled_regardless_of_request() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(20, DroneState::Delivering);

    let drone = fleet
        .service
        .request_state_change(&id, DroneState::Delivered)
        .unwrap();
    assert_eq!(drone.state, DroneState::Returning);
    assert!(drone.is_emergency_return);
}

#[test]
fn emergency_flag_clears_when_drone_returns_to_base() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(20, DroneState::Delivering);

    fleet
        .service
        .request_state_change(&id, DroneState::Delivered)
        .unwrap();
    let drone = fleet.store.get_drone(&id).unwrap();
    assert!(drone.is_emergency_return);

    let drone = fleet.service.request_state_change(&id, DroneState::Idle).unwrap();
    assert!(!drone.is_emergency_return);
    assert_eq!(drone.state, DroneState::Idle);
}

#[test]
fn exhausted_battery_grounds_the_drone_on_any_request() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(0, DroneState::Returning);

    let drone = fleet.service.request_state_change(&id, DroneState::Idle).unwrap();
    assert_eq!(drone.state, DroneState::Failed);
}

#[test]
fn registration_assigns_sequential_identifiers() {
    let fleet = TestFleet::new();
    for expected in ["D001", "D002", "D003"] {
        let drone = fleet
            .service
            .register_drone("Middleweight-Y", 400, 90)
            .unwrap();
        assert_eq!(drone.drone_id, expected);
    }
    assert_eq!(fleet.service.list_drones().unwrap().len(), 3);
}
