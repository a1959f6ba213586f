//! Medication catalog records

use serde::{Deserialize, Serialize};

/// Reference data describing a medication that drones may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Unique code, uppercase letters, digits, underscore and hyphen
    pub code: String,
    /// Display name, letters, spaces and hyphens
    pub name: String,
    /// Weight in grams
    pub weight: u32,
    /// Creation time, Unix milliseconds
    pub created_at: u64,
}
