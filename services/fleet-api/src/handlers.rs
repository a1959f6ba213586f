use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use skymed_domain::{DomainError, DroneState};
use skymed_fleet::FleetError;
use skymed_store::StoreError;
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

/// Boundary error: a fleet error plus the status code it maps to
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        let status = match &err {
            FleetError::Domain(DomainError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            FleetError::Domain(DomainError::InvalidState(_)) => StatusCode::BAD_REQUEST,
            FleetError::Domain(DomainError::InvalidTransition(_)) => StatusCode::BAD_REQUEST,
            FleetError::Store(StoreError::DroneNotFound { .. })
            | FleetError::Store(StoreError::MedicationNotFound { .. }) => StatusCode::NOT_FOUND,
            FleetError::Store(StoreError::DuplicateMedicationCode { .. })
            | FleetError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            FleetError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            FleetError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Internal error handling request");
            // Connectivity and database details stay out of client responses.
            return Self {
                status,
                message: "Internal server error".to_string(),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDroneRequest {
    model: String,
    weight_limit: u32,
    battery_capacity: i64,
}

#[derive(Deserialize)]
pub struct UpdateStateRequest {
    state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadMedicationsRequest {
    medication_codes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMedicationRequest {
    code: String,
    name: String,
    weight: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeQuery {
    start_time: Option<String>,
    end_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

pub async fn register_drone(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterDroneRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let drone = state
        .fleet
        .register_drone(&req.model, req.weight_limit, req.battery_capacity)?;
    Ok((StatusCode::CREATED, Json(json!(drone))))
}

pub async fn list_drones(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let drones = state.fleet.list_drones()?;
    Ok(Json(json!(drones)))
}

pub async fn get_drone(
    State(state): State<Arc<AppState>>,
    Path(drone_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let drone = state.fleet.get_drone(&drone_id)?;
    Ok(Json(json!(drone)))
}

pub async fn update_drone_state(
    State(state): State<Arc<AppState>>,
    Path(drone_id): Path<String>,
    Json(req): Json<UpdateStateRequest>,
) -> Result<Json<Value>, ApiError> {
    let requested = req
        .state
        .parse::<DroneState>()
        .map_err(|e| ApiError::from(FleetError::from(e)))?;
    let drone = state.fleet.request_state_change(&drone_id, requested)?;
    Ok(Json(json!({ "message": "Drone state updated", "drone": drone })))
}

pub async fn mark_failed(
    State(state): State<Arc<AppState>>,
    Path(drone_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let drone = state.fleet.mark_failed(&drone_id)?;
    Ok(Json(json!({
        "message": format!("Drone {} marked as FAILED.", drone.drone_id),
        "drone": drone,
    })))
}

pub async fn load_medications(
    State(state): State<Arc<AppState>>,
    Path(drone_id): Path<String>,
    Json(req): Json<LoadMedicationsRequest>,
) -> Result<Json<Value>, ApiError> {
    let log = state
        .loader
        .load_medications(&drone_id, &req.medication_codes)?;
    Ok(Json(json!({ "message": "Medications loaded successfully", "log": log })))
}

pub async fn add_medication(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMedicationRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let medication = state.fleet.add_medication(&req.code, &req.name, req.weight)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Medication added successfully", "medication": medication })),
    ))
}

pub async fn list_medications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let medications = state.fleet.list_medications()?;
    Ok(Json(json!(medications)))
}

/// Idempotent manual trigger for one drain cycle
pub async fn drain_tick(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let report = state.run_drain_cycle().await?;
    if report.updated.is_empty() && report.failures.is_empty() {
        return Ok(Json(json!({ "message": "No drones in motion" })));
    }
    Ok(Json(json!({
        "message": "Battery drain simulation complete",
        "updatedDrones": report.updated,
        "failures": report.failures,
    })))
}

pub async fn fleet_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Value>, ApiError> {
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some((parse_timestamp(&start)?, parse_timestamp(&end)?)),
        (None, None) => None,
        _ => {
            return Err(ApiError::bad_request(
                "startDate and endDate must be supplied together",
            ))
        }
    };
    let report = state.reporter.fleet_report(range)?;
    Ok(Json(json!({ "report": report })))
}

pub async fn battery_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = match (query.start_time, query.end_time) {
        (Some(start), Some(end)) => (parse_timestamp(&start)?, parse_timestamp(&end)?),
        _ => {
            return Err(ApiError::bad_request(
                "startTime and endTime are required in ISO 8601 format",
            ))
        }
    };
    let logs = state.reporter.battery_logs(start, end)?;
    Ok(Json(json!({ "logs": logs })))
}

pub async fn error_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let logs = state.reporter.error_logs()?;
    Ok(Json(json!(logs)))
}

fn parse_timestamp(raw: &str) -> Result<u64, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis().max(0) as u64)
        .map_err(|_| ApiError::bad_request("Invalid date format. Use ISO 8601"))
}
