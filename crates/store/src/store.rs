//! Fleet store engine
//!
//! SQLite backend with WAL mode, initialized once per process and shared as
//! an injected handle. Drone rows carry a `version` column; every
//! read-modify-write updates `WHERE drone_id = ? AND version = ?` and
//! increments it, so a writer holding a stale snapshot loses with a
//! [`StoreError::Conflict`] instead of clobbering a concurrent commit. Log
//! tables are strictly append-only.

use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use skymed_domain::{
    format_drone_id, BatteryLog, Drone, DroneMedicationLog, DroneState, ErrorLog, ErrorType,
    Medication,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Latest logged battery level for one drone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestBattery {
    /// Drone identifier
    pub drone_id: String,
    /// Most recent logged level, 0-100
    pub battery_level: u8,
}

/// Fleet store handle
///
/// Opened at process start, closed on drop at shutdown, and passed to every
/// component that needs persistence.
pub struct FleetStore {
    conn: Mutex<Connection>,
}

impl FleetStore {
    /// Create or open a fleet database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), "Opening fleet store");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // WAL mode for durability and concurrent readers
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory fleet database (tests)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize database schema
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS drones (
                drone_id            TEXT PRIMARY KEY,
                model               TEXT NOT NULL,
                weight_limit        INTEGER NOT NULL,
                battery_capacity    INTEGER NOT NULL,
                state               TEXT NOT NULL,
                is_emergency_return INTEGER NOT NULL DEFAULT 0,
                created_at          INTEGER NOT NULL,
                updated_at          INTEGER NOT NULL,
                version             INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS battery_logs (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                drone_id      TEXT NOT NULL REFERENCES drones(drone_id),
                battery_level INTEGER NOT NULL,
                created_at    INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS error_logs (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                drone_id   TEXT NOT NULL REFERENCES drones(drone_id),
                error_type TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS medications (
                code       TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                weight     INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS drone_medication_logs (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                drone_id         TEXT NOT NULL REFERENCES drones(drone_id),
                medication_codes TEXT NOT NULL,
                drone_state      TEXT NOT NULL,
                created_at       INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_battery_logs_drone ON battery_logs(drone_id);
            CREATE INDEX IF NOT EXISTS idx_battery_logs_created_at ON battery_logs(created_at);
            CREATE INDEX IF NOT EXISTS idx_error_logs_drone ON error_logs(drone_id);
            CREATE INDEX IF NOT EXISTS idx_med_logs_drone ON drone_medication_logs(drone_id);
            CREATE INDEX IF NOT EXISTS idx_drones_state ON drones(state);
            "#,
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Register a new drone, assigning the next sequential `D###` identifier
    pub fn register_drone(
        &self,
        model: &str,
        weight_limit: u32,
        battery_capacity: u8,
    ) -> Result<Drone> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let max_seq: Option<i64> = tx
            .query_row(
                "SELECT MAX(CAST(SUBSTR(drone_id, 2) AS INTEGER)) FROM drones",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        let drone_id = format_drone_id(max_seq.unwrap_or(0) as u32 + 1);

        let now = now_ms();
        tx.execute(
            r#"
            INSERT INTO drones (
                drone_id, model, weight_limit, battery_capacity, state,
                is_emergency_return, created_at, updated_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6, 1)
            "#,
            params![
                drone_id,
                model,
                weight_limit,
                battery_capacity,
                DroneState::Idle.as_str(),
                now as i64,
            ],
        )?;
        tx.commit()?;

        debug!(drone_id = %drone_id, model = %model, "Drone registered");

        Ok(Drone {
            drone_id,
            model: model.to_string(),
            weight_limit,
            battery_capacity,
            state: DroneState::Idle,
            is_emergency_return: false,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Fetch one drone by identifier
    pub fn get_drone(&self, drone_id: &str) -> Result<Drone> {
        let conn = self.lock()?;
        Self::get_drone_in(&conn, drone_id)
    }

    fn get_drone_in(conn: &Connection, drone_id: &str) -> Result<Drone> {
        let drone = conn
            .query_row(
                r#"
                SELECT drone_id, model, weight_limit, battery_capacity, state,
                       is_emergency_return, created_at, updated_at, version
                FROM drones WHERE drone_id = ?1
                "#,
                [drone_id],
                map_drone_row,
            )
            .optional()?;

        drone.ok_or_else(|| StoreError::DroneNotFound {
            drone_id: drone_id.to_string(),
        })
    }

    /// List every registered drone, ordered by identifier
    pub fn list_drones(&self) -> Result<Vec<Drone>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT drone_id, model, weight_limit, battery_capacity, state,
                   is_emergency_return, created_at, updated_at, version
            FROM drones ORDER BY drone_id ASC
            "#,
        )?;
        let drones = stmt
            .query_map([], map_drone_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(drones)
    }

    /// List drones currently in motion (DELIVERING or RETURNING)
    pub fn drones_in_motion(&self) -> Result<Vec<Drone>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT drone_id, model, weight_limit, battery_capacity, state,
                   is_emergency_return, created_at, updated_at, version
            FROM drones
            WHERE state IN (?1, ?2)
            ORDER BY drone_id ASC
            "#,
        )?;
        let drones = stmt
            .query_map(
                [
                    DroneState::Delivering.as_str(),
                    DroneState::Returning.as_str(),
                ],
                map_drone_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(drones)
    }

    /// Persist a drone's mutated lifecycle fields with conflict detection
    ///
    /// Only `battery_capacity`, `state` and `is_emergency_return` are
    /// writable; identity and registration fields are immutable. The update
    /// succeeds only if `drone.version` still matches the stored row, and
    /// the returned record carries the incremented version.
    pub fn update_drone(&self, drone: &Drone) -> Result<Drone> {
        let conn = self.lock()?;
        Self::update_drone_in(&conn, drone)
    }

    fn update_drone_in(conn: &Connection, drone: &Drone) -> Result<Drone> {
        let now = now_ms();
        let rows = conn.execute(
            r#"
            UPDATE drones
            SET battery_capacity = ?1, state = ?2, is_emergency_return = ?3,
                updated_at = ?4, version = version + 1
            WHERE drone_id = ?5 AND version = ?6
            "#,
            params![
                drone.battery_capacity,
                drone.state.as_str(),
                drone.is_emergency_return,
                now as i64,
                drone.drone_id,
                drone.version as i64,
            ],
        )?;

        if rows == 0 {
            // Distinguish a lost race from a missing record.
            return match Self::get_drone_in(conn, &drone.drone_id) {
                Ok(_) => Err(StoreError::Conflict {
                    drone_id: drone.drone_id.clone(),
                }),
                Err(e) => Err(e),
            };
        }

        let mut updated = drone.clone();
        updated.updated_at = now;
        updated.version += 1;
        Ok(updated)
    }

    /// Append one battery reading for a drone
    pub fn append_battery_log(&self, drone_id: &str, battery_level: u8) -> Result<BatteryLog> {
        let conn = self.lock()?;
        let now = now_ms();
        conn.execute(
            "INSERT INTO battery_logs (drone_id, battery_level, created_at) VALUES (?1, ?2, ?3)",
            params![drone_id, battery_level, now as i64],
        )?;
        Ok(BatteryLog {
            id: conn.last_insert_rowid(),
            drone_id: drone_id.to_string(),
            battery_level,
            created_at: now,
        })
    }

    /// Append one hazard record for a drone
    pub fn append_error_log(&self, drone_id: &str, error_type: ErrorType) -> Result<ErrorLog> {
        let conn = self.lock()?;
        let now = now_ms();
        conn.execute(
            "INSERT INTO error_logs (drone_id, error_type, created_at) VALUES (?1, ?2, ?3)",
            params![drone_id, error_type.as_str(), now as i64],
        )?;
        Ok(ErrorLog {
            id: conn.last_insert_rowid(),
            drone_id: drone_id.to_string(),
            error_type,
            created_at: now,
        })
    }

    /// Commit a medication load: the drone's LOADING transition and the
    /// audit log land in one scoped transaction, all-or-nothing
    ///
    /// `drone` must already carry the post-transition state; its version is
    /// checked the same way as [`FleetStore::update_drone`], so a concurrent
    /// writer rolls the whole load back with a conflict.
    pub fn commit_load(
        &self,
        drone: &Drone,
        medication_codes: &[String],
    ) -> Result<(Drone, DroneMedicationLog)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = Self::update_drone_in(&tx, drone)?;

        let now = now_ms();
        let codes_json = serde_json::to_string(medication_codes)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        tx.execute(
            r#"
            INSERT INTO drone_medication_logs (drone_id, medication_codes, drone_state, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![updated.drone_id, codes_json, updated.state.as_str(), now as i64],
        )?;
        let log_id = tx.last_insert_rowid();

        tx.commit()?;

        debug!(
            drone_id = %updated.drone_id,
            codes = %codes_json,
            "Medication load committed"
        );

        Ok((
            updated.clone(),
            DroneMedicationLog {
                id: log_id,
                drone_id: updated.drone_id,
                medication_codes: medication_codes.to_vec(),
                drone_state: updated.state,
                created_at: now,
            },
        ))
    }

    /// Commit one drain tick for one drone: the versioned update, the hazard
    /// record (when a threshold fired) and the battery reading land in one
    /// scoped transaction, all-or-nothing
    ///
    /// `drone` must already carry the post-evaluation battery, state and
    /// emergency flag. On a version conflict the whole tick rolls back and
    /// the drone's record and logs are untouched.
    pub fn commit_drain(
        &self,
        drone: &Drone,
        error_type: Option<ErrorType>,
    ) -> Result<(Drone, BatteryLog)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = Self::update_drone_in(&tx, drone)?;

        let now = now_ms();
        if let Some(error_type) = error_type {
            tx.execute(
                "INSERT INTO error_logs (drone_id, error_type, created_at) VALUES (?1, ?2, ?3)",
                params![updated.drone_id, error_type.as_str(), now as i64],
            )?;
        }
        tx.execute(
            "INSERT INTO battery_logs (drone_id, battery_level, created_at) VALUES (?1, ?2, ?3)",
            params![updated.drone_id, updated.battery_capacity, now as i64],
        )?;
        let log_id = tx.last_insert_rowid();

        tx.commit()?;

        Ok((
            updated.clone(),
            BatteryLog {
                id: log_id,
                drone_id: updated.drone_id,
                battery_level: updated.battery_capacity,
                created_at: now,
            },
        ))
    }

    /// Add a medication to the catalog
    pub fn add_medication(&self, code: &str, name: &str, weight: u32) -> Result<Medication> {
        let conn = self.lock()?;

        let exists: Option<String> = conn
            .query_row(
                "SELECT code FROM medications WHERE code = ?1",
                [code],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::DuplicateMedicationCode {
                code: code.to_string(),
            });
        }

        let now = now_ms();
        conn.execute(
            "INSERT INTO medications (code, name, weight, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![code, name, weight, now as i64],
        )?;
        Ok(Medication {
            code: code.to_string(),
            name: name.to_string(),
            weight,
            created_at: now,
        })
    }

    /// Fetch the catalog entries for the given codes, in catalog order
    ///
    /// Codes that do not resolve are simply absent from the result; the
    /// caller decides whether that is an error.
    pub fn get_medications(&self, codes: &[String]) -> Result<Vec<Medication>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; codes.len()].join(", ");
        let sql = format!(
            "SELECT code, name, weight, created_at FROM medications WHERE code IN ({placeholders}) ORDER BY code ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let medications = stmt
            .query_map(rusqlite::params_from_iter(codes.iter()), map_medication_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(medications)
    }

    /// List the whole medication catalog
    pub fn list_medications(&self) -> Result<Vec<Medication>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT code, name, weight, created_at FROM medications ORDER BY code ASC")?;
        let medications = stmt
            .query_map([], map_medication_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(medications)
    }

    /// Battery readings within a time range, newest first
    pub fn battery_logs_between(&self, start_ms: u64, end_ms: u64) -> Result<Vec<BatteryLog>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, drone_id, battery_level, created_at
            FROM battery_logs
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let logs = stmt
            .query_map(params![start_ms as i64, end_ms as i64], map_battery_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// All hazard records, newest first
    pub fn list_error_logs(&self) -> Result<Vec<ErrorLog>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, drone_id, error_type, created_at
            FROM error_logs
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let logs = stmt
            .query_map([], map_error_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Hazard records for one drone, oldest first
    pub fn error_logs_for_drone(&self, drone_id: &str) -> Result<Vec<ErrorLog>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, drone_id, error_type, created_at
            FROM error_logs
            WHERE drone_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let logs = stmt
            .query_map([drone_id], map_error_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Medication-load audit records for one drone, oldest first
    pub fn medication_logs_for_drone(&self, drone_id: &str) -> Result<Vec<DroneMedicationLog>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, drone_id, medication_codes, drone_state, created_at
            FROM drone_medication_logs
            WHERE drone_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let logs = stmt
            .query_map([drone_id], map_medication_log_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Latest logged battery level per drone, optionally restricted to a
    /// time range
    pub fn latest_battery_levels(
        &self,
        range: Option<(u64, u64)>,
    ) -> Result<Vec<LatestBattery>> {
        let conn = self.lock()?;
        // SQLite resolves the bare battery_level column against the row
        // that carries MAX(created_at) within each group.
        let (sql, bind): (&str, Vec<i64>) = match range {
            Some((start, end)) => (
                r#"
                SELECT drone_id, battery_level, MAX(created_at)
                FROM battery_logs
                WHERE created_at >= ?1 AND created_at <= ?2
                GROUP BY drone_id
                "#,
                vec![start as i64, end as i64],
            ),
            None => (
                r#"
                SELECT drone_id, battery_level, MAX(created_at)
                FROM battery_logs
                GROUP BY drone_id
                "#,
                Vec::new(),
            ),
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(bind.iter()), |row| {
                Ok(LatestBattery {
                    drone_id: row.get(0)?,
                    battery_level: row.get::<_, i64>(1)? as u8,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn map_drone_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Drone> {
    let state_raw: String = row.get(4)?;
    let state = state_raw.parse::<DroneState>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("invalid drone state {state_raw}").into(),
        )
    })?;
    Ok(Drone {
        drone_id: row.get(0)?,
        model: row.get(1)?,
        weight_limit: row.get::<_, i64>(2)? as u32,
        battery_capacity: row.get::<_, i64>(3)? as u8,
        state,
        is_emergency_return: row.get(5)?,
        created_at: row.get::<_, i64>(6)? as u64,
        updated_at: row.get::<_, i64>(7)? as u64,
        version: row.get::<_, i64>(8)? as u64,
    })
}

fn map_medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        code: row.get(0)?,
        name: row.get(1)?,
        weight: row.get::<_, i64>(2)? as u32,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn map_battery_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BatteryLog> {
    Ok(BatteryLog {
        id: row.get(0)?,
        drone_id: row.get(1)?,
        battery_level: row.get::<_, i64>(2)? as u8,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn map_error_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ErrorLog> {
    let type_raw: String = row.get(2)?;
    let error_type = type_raw.parse::<ErrorType>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("invalid error type {type_raw}").into(),
        )
    })?;
    Ok(ErrorLog {
        id: row.get(0)?,
        drone_id: row.get(1)?,
        error_type,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn map_medication_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DroneMedicationLog> {
    let codes_json: String = row.get(2)?;
    let medication_codes: Vec<String> = serde_json::from_str(&codes_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            e.to_string().into(),
        )
    })?;
    let state_raw: String = row.get(3)?;
    let drone_state = state_raw.parse::<DroneState>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid drone state {state_raw}").into(),
        )
    })?;
    Ok(DroneMedicationLog {
        id: row.get(0)?,
        drone_id: row.get(1)?,
        medication_codes,
        drone_state,
        created_at: row.get::<_, i64>(4)? as u64,
    })
}
