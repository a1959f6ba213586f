//! Drain cycles run against the persisted fleet

use crate::test_utils::TestFleet;
use skymed_domain::{DroneState, ErrorType};

#[test]
fn delivering_drone_crossing_low_threshold_is_recalled_and_logged() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(30, DroneState::Delivering);

    let report = fleet.simulator(vec![10]).run_tick().unwrap();
    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].new_battery_level, 20);

    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.state, DroneState::Returning);
    assert!(drone.is_emergency_return);

    let errors = fleet.store.error_logs_for_drone(&id).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, ErrorType::LowBattery);
}

#[test]
fn returning_drone_crossing_critical_threshold_is_grounded() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(10, DroneState::Returning);

    fleet.simulator(vec![8]).run_tick().unwrap();

    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.battery_capacity, 2);
    assert_eq!(drone.state, DroneState::Failed);

    let errors = fleet.store.error_logs_for_drone(&id).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, ErrorType::Failed);
}

#[test]
fn repeated_ticks_drain_a_mission_to_the_ground() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(40, DroneState::Delivering);
    let sim = fleet.simulator(vec![15]);

    // 40 -> 25 (still delivering) -> 10 (recalled) -> 0 (grounded).
    sim.run_tick().unwrap();
    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Delivering);

    sim.run_tick().unwrap();
    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.battery_capacity, 10);
    assert_eq!(drone.state, DroneState::Returning);

    sim.run_tick().unwrap();
    let drone = fleet.store.get_drone(&id).unwrap();
    assert_eq!(drone.battery_capacity, 0);
    assert_eq!(drone.state, DroneState::Failed);

    // Grounded drones leave the in-motion set; further ticks change nothing.
    let report = sim.run_tick().unwrap();
    assert!(report.updated.is_empty());

    let errors = fleet.store.error_logs_for_drone(&id).unwrap();
    assert_eq!(errors.len(), 2);
    // Oldest first: the recall precedes the grounding.
    assert_eq!(errors[0].error_type, ErrorType::LowBattery);
    assert_eq!(errors[1].error_type, ErrorType::Failed);
}

#[test]
fn every_tick_appends_one_battery_reading_per_drone_in_motion() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(90, DroneState::Delivering);
    fleet.drone_at(80, DroneState::Idle);
    let sim = fleet.simulator(vec![5]);

    sim.run_tick().unwrap();
    sim.run_tick().unwrap();

    let logs = fleet.store.battery_logs_between(0, u64::MAX / 2).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.drone_id == id));
    let mut levels: Vec<u8> = logs.iter().map(|l| l.battery_level).collect();
    levels.sort_unstable();
    assert_eq!(levels, vec![80, 85]);
}

#[test]
fn idle_fleet_survives_a_tick_untouched() {
    let fleet = TestFleet::new();
    fleet.drone_at(50, DroneState::Idle);
    fleet.drone_at(50, DroneState::Loading);
    fleet.drone_at(50, DroneState::Delivered);

    let report = fleet.simulator(vec![15]).run_tick().unwrap();
    assert!(report.updated.is_empty());
    assert!(report.failures.is_empty());
    for drone in fleet.store.list_drones().unwrap() {
        assert_eq!(drone.battery_capacity, 50);
    }
}

#[test]
fn mixed_fleet_tick_isolates_each_drone() {
    let fleet = TestFleet::new();
    let healthy = fleet.drone_at(90, DroneState::Delivering);
    let recalled = fleet.drone_at(28, DroneState::Delivering);
    let grounded = fleet.drone_at(7, DroneState::Returning);
    let sim = fleet.simulator(vec![5]);

    let report = sim.run_tick().unwrap();
    assert_eq!(report.updated.len(), 3);
    assert!(report.failures.is_empty());

    assert_eq!(fleet.store.get_drone(&healthy).unwrap().state, DroneState::Delivering);
    assert_eq!(fleet.store.get_drone(&recalled).unwrap().state, DroneState::Returning);
    assert_eq!(fleet.store.get_drone(&grounded).unwrap().state, DroneState::Failed);

    assert!(fleet.store.error_logs_for_drone(&healthy).unwrap().is_empty());
    assert_eq!(
        fleet.store.error_logs_for_drone(&recalled).unwrap()[0].error_type,
        ErrorType::LowBattery
    );
    assert_eq!(
        fleet.store.error_logs_for_drone(&grounded).unwrap()[0].error_type,
        ErrorType::Failed
    );
}
