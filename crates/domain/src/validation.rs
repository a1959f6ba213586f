//! Field validation
//!
//! The original persistence schema attached validators to individual fields;
//! here they are pure functions invoked before any write, independent of the
//! storage technology.

use crate::error::DomainError;
use regex::Regex;
use std::sync::LazyLock;

static DRONE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^D\d{3,}$").unwrap());
static MEDICATION_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9_-]+$").unwrap());
static MEDICATION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s-]+$").unwrap());

/// Validate a drone identifier (`D` followed by a zero-padded number)
pub fn validate_drone_id(drone_id: &str) -> Result<(), DomainError> {
    if DRONE_ID_RE.is_match(drone_id) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "droneId",
            format!("{drone_id} is not a valid drone id"),
        ))
    }
}

/// Validate the free-text model designation (non-empty after trimming)
pub fn validate_model(model: &str) -> Result<(), DomainError> {
    if model.trim().is_empty() {
        Err(DomainError::validation("model", "Model is required"))
    } else {
        Ok(())
    }
}

/// Validate the payload weight limit (positive grams)
pub fn validate_weight_limit(weight_limit: u32) -> Result<(), DomainError> {
    if weight_limit == 0 {
        Err(DomainError::validation(
            "weightLimit",
            "Weight limit must be a positive number",
        ))
    } else {
        Ok(())
    }
}

/// Validate a battery level supplied from the outside (0-100)
pub fn validate_battery_capacity(battery: i64) -> Result<(), DomainError> {
    if !(0..=100).contains(&battery) {
        Err(DomainError::validation(
            "batteryCapacity",
            "Battery capacity must be between 0 and 100",
        ))
    } else {
        Ok(())
    }
}

/// Validate a medication code against the catalog pattern
pub fn validate_medication_code(code: &str) -> Result<(), DomainError> {
    if MEDICATION_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "code",
            format!("{code} is not a valid medication code"),
        ))
    }
}

/// Validate a medication display name
pub fn validate_medication_name(name: &str) -> Result<(), DomainError> {
    if MEDICATION_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "name",
            format!("{name} is not a valid medication name"),
        ))
    }
}
