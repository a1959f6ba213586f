//! Reports and audit trails built from real fleet activity

use crate::test_utils::TestFleet;
use skymed_domain::{DroneState, ErrorType};

#[test]
fn report_reflects_the_latest_logged_levels_after_drain_cycles() {
    let fleet = TestFleet::new();
    let flying = fleet.drone_at(60, DroneState::Delivering);
    let parked = fleet.drone_at(100, DroneState::Idle);
    let sim = fleet.simulator(vec![10]);

    sim.run_tick().unwrap();
    sim.run_tick().unwrap();

    let report = fleet.reporter.fleet_report(None).unwrap();
    assert_eq!(report.len(), 2);

    let flying_row = report.iter().find(|r| r.drone_id == flying).unwrap();
    assert_eq!(flying_row.battery_capacity, Some(40));
    assert_eq!(flying_row.state, DroneState::Delivering);
    assert_eq!(flying_row.model, "Lightweight-X");

    // Parked drones never drained, so they carry no logged reading.
    let parked_row = report.iter().find(|r| r.drone_id == parked).unwrap();
    assert_eq!(parked_row.battery_capacity, None);
    assert_eq!(parked_row.state, DroneState::Idle);
}

#[test]
fn battery_log_window_captures_the_drain_history() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(90, DroneState::Returning);
    let sim = fleet.simulator(vec![15]);

    sim.run_tick().unwrap();
    sim.run_tick().unwrap();
    sim.run_tick().unwrap();

    let views = fleet.reporter.battery_logs(0, u64::MAX / 2).unwrap();
    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|v| v.drone_id == id));
    assert!(views.iter().all(|v| v.model == "Lightweight-X"));
    // Newest first.
    assert_eq!(views[0].battery_level, 45);
    assert_eq!(views[2].battery_level, 75);
}

#[test]
fn hazard_trail_orders_a_whole_mission_failure() {
    let fleet = TestFleet::new();
    let id = fleet.drone_at(26, DroneState::Delivering);
    let sim = fleet.simulator(vec![11]);

    // 26 -> 15 recalls the drone, 15 -> 4 grounds it.
    sim.run_tick().unwrap();
    sim.run_tick().unwrap();

    let logs = fleet.reporter.error_logs().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].drone_id, id);
    assert_eq!(logs[0].error_type, ErrorType::Failed);
    assert_eq!(logs[1].error_type, ErrorType::LowBattery);

    assert_eq!(fleet.store.get_drone(&id).unwrap().state, DroneState::Failed);
}

#[test]
fn report_rows_serialize_with_wire_field_names() {
    let fleet = TestFleet::new();
    fleet.drone_at(60, DroneState::Delivering);
    fleet.simulator(vec![10]).run_tick().unwrap();

    let report = fleet.reporter.fleet_report(None).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    let row = &value[0];
    assert_eq!(row["droneId"], "D001");
    assert_eq!(row["weightLimit"], 300);
    assert_eq!(row["batteryCapacity"], 50);
    assert_eq!(row["state"], "DELIVERING");
}
