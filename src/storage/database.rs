//! Database operations using rusqlite.
//!
//! Owns the connection, schema migration, and the user and weight-entry
//! tables. Nutrition and workout tables are handled by the stores in
//! `nutrition_store` and `workout_store`.

use crate::account::User;
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::tracking::types::WeightEntry;
use crate::units::Unit;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::path::PathBuf;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        // SQLite leaves foreign key enforcement off per connection
        self.conn
            .pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            // Initial schema
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        // Future migrations would go here:
        // if from_version < 2 { ... }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> Result<rusqlite::Transaction<'_>, DatabaseError> {
        self.conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }

    // ========== User CRUD Operations ==========

    /// Insert a new user, returning the assigned rowid.
    pub fn insert_user(&self, user: &User) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash, goal_weight_kg, phone_number,
                 preferred_unit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.username,
                    user.password_hash,
                    user.goal_weight_kg,
                    user.phone_number,
                    user.preferred_unit.to_string(),
                    user.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::ConstraintViolation(format!(
                        "username already taken: {}",
                        user.username
                    ))
                }
                e => DatabaseError::QueryFailed(e.to_string()),
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, password_hash, goal_weight_kg, phone_number,
                 preferred_unit, created_at FROM users WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id], Self::map_user_row);

        match result {
            Ok(row) => Ok(Some(row.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a user by username (login lookup).
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, password_hash, goal_weight_kg, phone_number,
                 preferred_unit, created_at FROM users WHERE username = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![username], Self::map_user_row);

        match result {
            Ok(row) => Ok(Some(row.into_user()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    fn map_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            goal_weight_kg: row.get(3)?,
            phone_number: row.get(4)?,
            preferred_unit: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    /// Update a user's goal weight.
    pub fn update_goal_weight(&self, user_id: i64, goal_kg: f64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE users SET goal_weight_kg = ?2 WHERE id = ?1",
                params![user_id, goal_kg],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", user_id)));
        }

        Ok(())
    }

    /// Update a user's preferred display unit.
    pub fn update_preferred_unit(&self, user_id: i64, unit: Unit) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE users SET preferred_unit = ?2 WHERE id = ?1",
                params![user_id, unit.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", user_id)));
        }

        Ok(())
    }

    /// Update a user's phone number.
    pub fn update_phone_number(&self, user_id: i64, phone: &str) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE users SET phone_number = ?2 WHERE id = ?1",
                params![user_id, phone],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", user_id)));
        }

        Ok(())
    }

    /// Update a user's password hash.
    pub fn update_password_hash(&self, user_id: i64, hash: &str) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE users SET password_hash = ?2 WHERE id = ?1",
                params![user_id, hash],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", user_id)));
        }

        Ok(())
    }

    /// Delete a user by ID (cascades to entries, meals, and workouts).
    pub fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("User {}", id)));
        }

        Ok(())
    }

    /// Count users in the database.
    pub fn count_users(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    // ========== Weight Entry CRUD Operations ==========

    /// Insert a new weight entry, returning the assigned rowid.
    pub fn insert_weight_entry(&self, entry: &WeightEntry) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO weight_entries (user_id, weight_kg, recorded_at)
                 VALUES (?1, ?2, ?3)",
                params![
                    entry.user_id,
                    entry.weight_kg,
                    entry.recorded_at.to_rfc3339()
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// List a user's weight entries, ordered ascending by date.
    pub fn list_weight_entries(&self, user_id: i64) -> Result<Vec<WeightEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, weight_kg, recorded_at FROM weight_entries
                 WHERE user_id = ?1 ORDER BY recorded_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(WeightEntryRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    weight_kg: row.get(2)?,
                    recorded_at: row.get(3)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            entries.push(row.into_entry()?);
        }

        Ok(entries)
    }

    /// List a user's entries within a time range, ascending.
    pub fn list_weight_entries_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WeightEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, weight_kg, recorded_at FROM weight_entries
                 WHERE user_id = ?1 AND recorded_at >= ?2 AND recorded_at <= ?3
                 ORDER BY recorded_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![user_id, from.to_rfc3339(), to.to_rfc3339()],
                |row| {
                    Ok(WeightEntryRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        weight_kg: row.get(2)?,
                        recorded_at: row.get(3)?,
                    })
                },
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            entries.push(row.into_entry()?);
        }

        Ok(entries)
    }

    /// Get the most recent weight entry for a user.
    pub fn latest_weight_entry(&self, user_id: i64) -> Result<Option<WeightEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, weight_kg, recorded_at FROM weight_entries
                 WHERE user_id = ?1 ORDER BY recorded_at DESC LIMIT 1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![user_id], |row| {
            Ok(WeightEntryRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                weight_kg: row.get(2)?,
                recorded_at: row.get(3)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_entry()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Delete a weight entry by ID.
    pub fn delete_weight_entry(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM weight_entries WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Weight entry {}", id)));
        }

        Ok(())
    }

    /// Count weight entries for a user.
    pub fn count_weight_entries(&self, user_id: i64) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM weight_entries WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

/// Intermediate struct for reading user rows from the database.
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    goal_weight_kg: f64,
    phone_number: String,
    preferred_unit: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, DatabaseError> {
        let preferred_unit = Unit::parse(&self.preferred_unit).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown unit: {}", self.preferred_unit))
        })?;

        let created_at = parse_timestamp(&self.created_at)?;

        Ok(User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            goal_weight_kg: self.goal_weight_kg,
            phone_number: self.phone_number,
            preferred_unit,
            created_at,
        })
    }
}

/// Intermediate struct for reading weight entry rows from the database.
struct WeightEntryRow {
    id: i64,
    user_id: i64,
    weight_kg: f64,
    recorded_at: String,
}

impl WeightEntryRow {
    fn into_entry(self) -> Result<WeightEntry, DatabaseError> {
        Ok(WeightEntry {
            id: self.id,
            user_id: self.user_id,
            weight_kg: self.weight_kg,
            recorded_at: parse_timestamp(&self.recorded_at)?,
        })
    }
}

/// Parse an RFC 3339 timestamp stored as TEXT.
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_user(name: &str) -> User {
        User::new(name, "100000$ab$cd", 75.0, "5551234567")
    }

    #[test]
    fn test_create_in_memory_database() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let version = db.get_schema_version().expect("Failed to get version");
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let db = Database::open_in_memory().expect("Failed to create database");

        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"weight_entries".to_string()));
        assert!(tables.contains(&"foods".to_string()));
        assert!(tables.contains(&"meals".to_string()));
        assert!(tables.contains(&"meal_foods".to_string()));
        assert!(tables.contains(&"daily_nutrition_summary".to_string()));
        assert!(tables.contains(&"nutrition_goals".to_string()));
        assert!(tables.contains(&"exercises".to_string()));
        assert!(tables.contains(&"workout_sessions".to_string()));
        assert!(tables.contains(&"workout_sets".to_string()));
        assert!(tables.contains(&"personal_records".to_string()));
        assert!(tables.contains(&"workout_templates".to_string()));
    }

    #[test]
    fn test_user_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_user(&test_user("alice_99")).unwrap();
        assert!(id > 0);

        let user = db.get_user(id).unwrap().expect("User not found");
        assert_eq!(user.username, "alice_99");
        assert_eq!(user.goal_weight_kg, 75.0);
        assert_eq!(user.preferred_unit, Unit::Kg);

        let by_name = db.get_user_by_username("alice_99").unwrap().unwrap();
        assert_eq!(by_name.id, id);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&test_user("alice_99")).unwrap();

        let result = db.insert_user(&test_user("alice_99"));
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn test_get_missing_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_user(999).unwrap().is_none());
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_update_goal_weight() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_user(&test_user("alice_99")).unwrap();

        db.update_goal_weight(id, 70.0).unwrap();
        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.goal_weight_kg, 70.0);

        assert!(matches!(
            db.update_goal_weight(999, 70.0),
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_preferred_unit() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_user(&test_user("alice_99")).unwrap();

        db.update_preferred_unit(id, Unit::Lbs).unwrap();
        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.preferred_unit, Unit::Lbs);
    }

    #[test]
    fn test_weight_entry_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.insert_user(&test_user("alice_99")).unwrap();

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let entry_id = db
            .insert_weight_entry(&WeightEntry::new(user_id, 82.5, at))
            .unwrap();
        assert!(entry_id > 0);

        let entries = db.list_weight_entries(user_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weight_kg, 82.5);
        assert_eq!(entries[0].recorded_at, at);
    }

    #[test]
    fn test_entries_ordered_ascending() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.insert_user(&test_user("alice_99")).unwrap();

        let day1 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();

        // Insert out of order
        db.insert_weight_entry(&WeightEntry::new(user_id, 82.0, day2))
            .unwrap();
        db.insert_weight_entry(&WeightEntry::new(user_id, 82.5, day1))
            .unwrap();

        let entries = db.list_weight_entries(user_id).unwrap();
        assert_eq!(entries[0].weight_kg, 82.5);
        assert_eq!(entries[1].weight_kg, 82.0);

        let latest = db.latest_weight_entry(user_id).unwrap().unwrap();
        assert_eq!(latest.weight_kg, 82.0);
    }

    #[test]
    fn test_entries_between() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.insert_user(&test_user("alice_99")).unwrap();

        for day in 1..=5 {
            let at = Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap();
            db.insert_weight_entry(&WeightEntry::new(user_id, 80.0 + day as f64, at))
                .unwrap();
        }

        let from = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 4, 23, 59, 59).unwrap();
        let entries = db.list_weight_entries_between(user_id, from, to).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].weight_kg, 82.0);
        assert_eq!(entries[2].weight_kg, 84.0);
    }

    #[test]
    fn test_delete_user_cascades_entries() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.insert_user(&test_user("alice_99")).unwrap();

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        db.insert_weight_entry(&WeightEntry::new(user_id, 82.5, at))
            .unwrap();

        db.delete_user(user_id).unwrap();
        assert_eq!(db.count_users().unwrap(), 0);
        assert_eq!(db.count_weight_entries(user_id).unwrap(), 0);
    }

    #[test]
    fn test_delete_weight_entry() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db.insert_user(&test_user("alice_99")).unwrap();

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let entry_id = db
            .insert_weight_entry(&WeightEntry::new(user_id, 82.5, at))
            .unwrap();

        db.delete_weight_entry(entry_id).unwrap();
        assert!(matches!(
            db.delete_weight_entry(entry_id),
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("weighttrack.db");

        let db = Database::open(&path).expect("Failed to open database");
        assert!(path.exists());
        assert_eq!(db.count_users().unwrap(), 0);
    }
}
