//! Workout data storage operations.
//!
//! Provides persistence for:
//! - Exercise catalog (built-in and custom)
//! - Workout sessions and sets
//! - Personal records
//! - Workout templates

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::storage::database::{parse_timestamp, DatabaseError};
use crate::workouts::analyzer;
use crate::workouts::types::{
    Exercise, PersonalRecord, RecordType, WorkoutSession, WorkoutSet, WorkoutTemplate,
};

/// Default exercise catalog seeded on first run: (name, category, equipment).
const DEFAULT_EXERCISES: &[(&str, &str, &str)] = &[
    ("Barbell Squat", "legs", "barbell"),
    ("Bench Press", "chest", "barbell"),
    ("Deadlift", "back", "barbell"),
    ("Overhead Press", "shoulders", "barbell"),
    ("Barbell Row", "back", "barbell"),
    ("Pull-up", "back", "bodyweight"),
    ("Dumbbell Curl", "arms", "dumbbell"),
    ("Tricep Pushdown", "arms", "cable"),
    ("Leg Press", "legs", "machine"),
    ("Plank", "core", "bodyweight"),
];

/// Workout store for exercises, sessions, sets, and records.
pub struct WorkoutStore<'a> {
    conn: &'a Connection,
}

impl<'a> WorkoutStore<'a> {
    /// Create a new workout store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Exercise Catalog ==========

    /// Seed the built-in exercise catalog if the table is empty.
    pub fn seed_default_exercises(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM exercises WHERE is_custom = 0",
                [],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if count > 0 {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        for (name, category, equipment) in DEFAULT_EXERCISES {
            self.conn
                .execute(
                    "INSERT INTO exercises (name, category, equipment, is_custom, created_at)
                     VALUES (?1, ?2, ?3, 0, ?4)",
                    params![name, category, equipment, now],
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        tracing::info!("Seeded {} default exercises", DEFAULT_EXERCISES.len());
        Ok(DEFAULT_EXERCISES.len())
    }

    /// Insert an exercise, returning the assigned rowid.
    pub fn insert_exercise(&self, exercise: &Exercise) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO exercises (name, category, equipment, primary_muscle,
                 secondary_muscle, description, is_custom, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    exercise.name,
                    exercise.category,
                    exercise.equipment,
                    exercise.primary_muscle,
                    exercise.secondary_muscle,
                    exercise.description,
                    exercise.is_custom as i32,
                    exercise.user_id,
                    exercise.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get an exercise by ID.
    pub fn get_exercise(&self, id: i64) -> Result<Option<Exercise>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, category, equipment, primary_muscle, secondary_muscle,
                 description, is_custom, user_id, created_at FROM exercises WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id], Self::map_exercise_row);

        match result {
            Ok(row) => Ok(Some(row.into_exercise()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Find an exercise by exact name, case-insensitive.
    pub fn get_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, category, equipment, primary_muscle, secondary_muscle,
                 description, is_custom, user_id, created_at FROM exercises
                 WHERE name = ?1 COLLATE NOCASE",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![name], Self::map_exercise_row);

        match result {
            Ok(row) => Ok(Some(row.into_exercise()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// List all exercises, optionally filtered by category.
    pub fn list_exercises(&self, category: Option<&str>) -> Result<Vec<Exercise>, DatabaseError> {
        let sql = match category {
            Some(_) => {
                "SELECT id, name, category, equipment, primary_muscle, secondary_muscle,
                 description, is_custom, user_id, created_at FROM exercises
                 WHERE category = ?1 ORDER BY name ASC"
            }
            None => {
                "SELECT id, name, category, equipment, primary_muscle, secondary_muscle,
                 description, is_custom, user_id, created_at FROM exercises ORDER BY name ASC"
            }
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut exercises = Vec::new();

        if let Some(category) = category {
            let rows = stmt
                .query_map(params![category], Self::map_exercise_row)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            for row in rows {
                let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
                exercises.push(row.into_exercise()?);
            }
        } else {
            let rows = stmt
                .query_map([], Self::map_exercise_row)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            for row in rows {
                let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
                exercises.push(row.into_exercise()?);
            }
        }

        Ok(exercises)
    }

    /// Search exercises by name, case-insensitive substring match.
    pub fn search_exercises(&self, query: &str) -> Result<Vec<Exercise>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, category, equipment, primary_muscle, secondary_muscle,
                 description, is_custom, user_id, created_at FROM exercises
                 WHERE name LIKE ?1 ORDER BY name ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let pattern = format!("%{}%", query);
        let rows = stmt
            .query_map(params![pattern], Self::map_exercise_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut exercises = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            exercises.push(row.into_exercise()?);
        }

        Ok(exercises)
    }

    /// Delete an exercise. Fails with a constraint error when sets reference
    /// it.
    pub fn delete_exercise(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::ConstraintViolation(format!(
                        "exercise {} is referenced by logged sets",
                        id
                    ))
                }
                e => DatabaseError::QueryFailed(e.to_string()),
            })?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Exercise {}", id)));
        }

        Ok(())
    }

    fn map_exercise_row(row: &rusqlite::Row) -> rusqlite::Result<ExerciseRow> {
        Ok(ExerciseRow {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            equipment: row.get(3)?,
            primary_muscle: row.get(4)?,
            secondary_muscle: row.get(5)?,
            description: row.get(6)?,
            is_custom: row.get(7)?,
            user_id: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    // ========== Sessions ==========

    /// Insert a workout session, returning the assigned rowid.
    pub fn insert_session(&self, session: &WorkoutSession) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO workout_sessions (user_id, date, started_at, duration_minutes,
                 notes, total_volume, total_sets)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.user_id,
                    session.date.to_string(),
                    session.started_at.to_rfc3339(),
                    session.duration_minutes,
                    session.notes,
                    session.total_volume,
                    session.total_sets,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get a session by ID.
    pub fn get_session(&self, id: i64) -> Result<Option<WorkoutSession>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, user_id, date, started_at, duration_minutes, notes,
             total_volume, total_sets FROM workout_sessions WHERE id = ?1",
            params![id],
            Self::map_session_row,
        );

        match result {
            Ok(row) => Ok(Some(row.into_session()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// List a user's sessions, most recent first.
    pub fn list_sessions(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<WorkoutSession>, DatabaseError> {
        let limit = limit.unwrap_or(100);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, date, started_at, duration_minutes, notes,
                 total_volume, total_sets FROM workout_sessions
                 WHERE user_id = ?1 ORDER BY started_at DESC LIMIT ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, limit], Self::map_session_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            sessions.push(row.into_session()?);
        }

        Ok(sessions)
    }

    /// Sessions logged on one calendar day, in start order.
    pub fn sessions_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<WorkoutSession>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, date, started_at, duration_minutes, notes,
                 total_volume, total_sets FROM workout_sessions
                 WHERE user_id = ?1 AND date = ?2 ORDER BY started_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, date.to_string()], Self::map_session_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            sessions.push(row.into_session()?);
        }

        Ok(sessions)
    }

    fn map_session_row(row: &rusqlite::Row) -> rusqlite::Result<SessionRow> {
        Ok(SessionRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            started_at: row.get(3)?,
            duration_minutes: row.get(4)?,
            notes: row.get(5)?,
            total_volume: row.get(6)?,
            total_sets: row.get(7)?,
        })
    }

    /// Update a session's duration once the workout is finished.
    pub fn update_session_duration(
        &self,
        session_id: i64,
        duration_minutes: u32,
    ) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE workout_sessions SET duration_minutes = ?2 WHERE id = ?1",
                params![session_id, duration_minutes],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Session {}", session_id)));
        }

        Ok(())
    }

    /// Delete a session by ID (cascades to its sets).
    pub fn delete_session(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM workout_sessions WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Session {}", id)));
        }

        Ok(())
    }

    /// Total volumes of a user's most recent sessions, oldest first.
    /// Input shape expected by the deload check.
    pub fn recent_session_volumes(
        &self,
        user_id: i64,
        count: u32,
    ) -> Result<Vec<f64>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT total_volume FROM workout_sessions
                 WHERE user_id = ?1 ORDER BY started_at DESC LIMIT ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, count], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut volumes: Vec<f64> = Vec::new();
        for row in rows {
            volumes.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        volumes.reverse();
        Ok(volumes)
    }

    // ========== Sets ==========

    /// Record a set. Computes volume and estimated 1RM, folds the volume
    /// into the session totals, and updates personal records.
    pub fn add_set(
        &self,
        user_id: i64,
        set: &WorkoutSet,
        date: NaiveDate,
    ) -> Result<WorkoutSet, DatabaseError> {
        let volume = analyzer::set_volume(set.weight_kg, set.reps);
        let estimated_one_rm = analyzer::one_rm(set.weight_kg, set.reps);

        self.conn
            .execute(
                "INSERT INTO workout_sets (session_id, exercise_id, set_number, weight_kg,
                 reps, rpe, notes, estimated_one_rm, volume, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    set.session_id,
                    set.exercise_id,
                    set.set_number,
                    set.weight_kg,
                    set.reps,
                    set.rpe,
                    set.notes,
                    estimated_one_rm,
                    volume,
                    set.recorded_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let id = self.conn.last_insert_rowid();

        let rows_affected = self
            .conn
            .execute(
                "UPDATE workout_sessions SET
                 total_volume = total_volume + ?2,
                 total_sets = total_sets + 1
                 WHERE id = ?1",
                params![set.session_id, volume],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Session {}",
                set.session_id
            )));
        }

        self.update_record(user_id, set.exercise_id, RecordType::MaxWeight, set.weight_kg, Some(set.reps), date)?;
        self.update_record(user_id, set.exercise_id, RecordType::MaxVolume, volume, None, date)?;
        self.update_record(user_id, set.exercise_id, RecordType::MaxReps, f64::from(set.reps), None, date)?;
        self.update_record(user_id, set.exercise_id, RecordType::EstimatedOneRm, estimated_one_rm, None, date)?;

        Ok(WorkoutSet {
            id,
            estimated_one_rm: Some(estimated_one_rm),
            volume,
            ..set.clone()
        })
    }

    /// List the sets of a session in recording order.
    pub fn list_sets(&self, session_id: i64) -> Result<Vec<WorkoutSet>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, session_id, exercise_id, set_number, weight_kg, reps, rpe,
                 notes, estimated_one_rm, volume, recorded_at FROM workout_sets
                 WHERE session_id = ?1 ORDER BY recorded_at ASC, id ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(SetRow {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    exercise_id: row.get(2)?,
                    set_number: row.get(3)?,
                    weight_kg: row.get(4)?,
                    reps: row.get(5)?,
                    rpe: row.get(6)?,
                    notes: row.get(7)?,
                    estimated_one_rm: row.get(8)?,
                    volume: row.get(9)?,
                    recorded_at: row.get(10)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sets = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            sets.push(row.into_set()?);
        }

        Ok(sets)
    }

    // ========== Personal Records ==========

    /// Keep the best value per (user, exercise, record type).
    fn update_record(
        &self,
        user_id: i64,
        exercise_id: i64,
        record_type: RecordType,
        value: f64,
        reps: Option<u32>,
        achieved_on: NaiveDate,
    ) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO personal_records (user_id, exercise_id, record_type, value, reps, achieved_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id, exercise_id, record_type) DO UPDATE SET
                    value = CASE WHEN excluded.value > value THEN excluded.value ELSE value END,
                    reps = CASE WHEN excluded.value > value THEN excluded.reps ELSE reps END,
                    achieved_on = CASE WHEN excluded.value > value THEN excluded.achieved_on ELSE achieved_on END",
                params![
                    user_id,
                    exercise_id,
                    record_type.as_str(),
                    value,
                    reps,
                    achieved_on.to_string(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// List a user's personal records for one exercise.
    pub fn list_records(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Vec<PersonalRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, exercise_id, record_type, value, reps, achieved_on
                 FROM personal_records WHERE user_id = ?1 AND exercise_id = ?2
                 ORDER BY record_type ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, exercise_id], |row| {
                Ok(RecordRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    exercise_id: row.get(2)?,
                    record_type: row.get(3)?,
                    value: row.get(4)?,
                    reps: row.get(5)?,
                    achieved_on: row.get(6)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            records.push(row.into_record()?);
        }

        Ok(records)
    }

    /// Get one record for a user, exercise, and record type.
    pub fn get_record(
        &self,
        user_id: i64,
        exercise_id: i64,
        record_type: RecordType,
    ) -> Result<Option<PersonalRecord>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, user_id, exercise_id, record_type, value, reps, achieved_on
             FROM personal_records
             WHERE user_id = ?1 AND exercise_id = ?2 AND record_type = ?3",
            params![user_id, exercise_id, record_type.as_str()],
            |row| {
                Ok(RecordRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    exercise_id: row.get(2)?,
                    record_type: row.get(3)?,
                    value: row.get(4)?,
                    reps: row.get(5)?,
                    achieved_on: row.get(6)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_record()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    // ========== Templates ==========

    /// Save a workout template, returning the assigned rowid.
    pub fn insert_template(&self, template: &WorkoutTemplate) -> Result<i64, DatabaseError> {
        let exercise_ids_json = serde_json::to_string(&template.exercise_ids)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO workout_templates (user_id, name, description, exercise_ids_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    template.user_id,
                    template.name,
                    template.description,
                    exercise_ids_json,
                    template.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// List a user's templates, newest first.
    pub fn list_templates(&self, user_id: i64) -> Result<Vec<WorkoutTemplate>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, name, description, exercise_ids_json, created_at
                 FROM workout_templates WHERE user_id = ?1 ORDER BY created_at DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(TemplateRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    exercise_ids_json: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut templates = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            templates.push(row.into_template()?);
        }

        Ok(templates)
    }

    /// Delete a template by ID.
    pub fn delete_template(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM workout_templates WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Template {}", id)));
        }

        Ok(())
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}

/// Intermediate struct for reading exercise rows from the database.
struct ExerciseRow {
    id: i64,
    name: String,
    category: String,
    equipment: Option<String>,
    primary_muscle: Option<String>,
    secondary_muscle: Option<String>,
    description: Option<String>,
    is_custom: i32,
    user_id: Option<i64>,
    created_at: String,
}

impl ExerciseRow {
    fn into_exercise(self) -> Result<Exercise, DatabaseError> {
        Ok(Exercise {
            id: self.id,
            name: self.name,
            category: self.category,
            equipment: self.equipment,
            primary_muscle: self.primary_muscle,
            secondary_muscle: self.secondary_muscle,
            description: self.description,
            is_custom: self.is_custom != 0,
            user_id: self.user_id,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Intermediate struct for reading session rows from the database.
struct SessionRow {
    id: i64,
    user_id: i64,
    date: String,
    started_at: String,
    duration_minutes: u32,
    notes: Option<String>,
    total_volume: f64,
    total_sets: u32,
}

impl SessionRow {
    fn into_session(self) -> Result<WorkoutSession, DatabaseError> {
        Ok(WorkoutSession {
            id: self.id,
            user_id: self.user_id,
            date: parse_date(&self.date)?,
            started_at: parse_timestamp(&self.started_at)?,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            total_volume: self.total_volume,
            total_sets: self.total_sets,
        })
    }
}

/// Intermediate struct for reading set rows from the database.
struct SetRow {
    id: i64,
    session_id: i64,
    exercise_id: i64,
    set_number: u32,
    weight_kg: f64,
    reps: u32,
    rpe: Option<u8>,
    notes: Option<String>,
    estimated_one_rm: Option<f64>,
    volume: f64,
    recorded_at: String,
}

impl SetRow {
    fn into_set(self) -> Result<WorkoutSet, DatabaseError> {
        Ok(WorkoutSet {
            id: self.id,
            session_id: self.session_id,
            exercise_id: self.exercise_id,
            set_number: self.set_number,
            weight_kg: self.weight_kg,
            reps: self.reps,
            rpe: self.rpe,
            notes: self.notes,
            estimated_one_rm: self.estimated_one_rm,
            volume: self.volume,
            recorded_at: parse_timestamp(&self.recorded_at)?,
        })
    }
}

/// Intermediate struct for reading record rows from the database.
struct RecordRow {
    id: i64,
    user_id: i64,
    exercise_id: i64,
    record_type: String,
    value: f64,
    reps: Option<u32>,
    achieved_on: String,
}

impl RecordRow {
    fn into_record(self) -> Result<PersonalRecord, DatabaseError> {
        let record_type = RecordType::parse(&self.record_type).ok_or_else(|| {
            DatabaseError::DeserializationError(format!(
                "Unknown record type: {}",
                self.record_type
            ))
        })?;

        Ok(PersonalRecord {
            id: self.id,
            user_id: self.user_id,
            exercise_id: self.exercise_id,
            record_type,
            value: self.value,
            reps: self.reps,
            achieved_on: parse_date(&self.achieved_on)?,
        })
    }
}

/// Intermediate struct for reading template rows from the database.
struct TemplateRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    exercise_ids_json: String,
    created_at: String,
}

impl TemplateRow {
    fn into_template(self) -> Result<WorkoutTemplate, DatabaseError> {
        let exercise_ids: Vec<i64> = serde_json::from_str(&self.exercise_ids_json)
            .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?;

        Ok(WorkoutTemplate {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            exercise_ids,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::User;
    use crate::storage::database::Database;
    use chrono::Utc;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user_id = db
            .insert_user(&User::new("alice_99", "100000$ab$cd", 75.0, "5551234567"))
            .unwrap();
        (db, user_id)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_seed_default_exercises_once() {
        let (db, _) = setup();
        let store = WorkoutStore::new(db.connection());

        let seeded = store.seed_default_exercises().unwrap();
        assert_eq!(seeded, DEFAULT_EXERCISES.len());

        // Second seed is a no-op
        assert_eq!(store.seed_default_exercises().unwrap(), 0);

        let legs = store.list_exercises(Some("legs")).unwrap();
        assert_eq!(legs.len(), 2);
    }

    #[test]
    fn test_exercise_lookup_by_name() {
        let (db, _) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let squat = store
            .get_exercise_by_name("barbell squat")
            .unwrap()
            .expect("Exercise not found");
        assert_eq!(squat.category, "legs");
        assert!(!squat.is_custom);

        assert!(store.get_exercise_by_name("nope").unwrap().is_none());
    }

    #[test]
    fn test_search_and_delete_exercise() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let presses = store.search_exercises("press").unwrap();
        assert_eq!(presses.len(), 3); // Bench, Overhead, Leg Press

        let mut custom = Exercise::new("Box Jump", "legs");
        custom.is_custom = true;
        custom.user_id = Some(user_id);
        let id = store.insert_exercise(&custom).unwrap();

        store.delete_exercise(id).unwrap();
        assert!(store.get_exercise(id).unwrap().is_none());

        // Referenced exercises cannot be deleted
        let squat = store.get_exercise_by_name("Barbell Squat").unwrap().unwrap();
        let session_id = store
            .insert_session(&WorkoutSession::new(user_id, date()))
            .unwrap();
        store
            .add_set(user_id, &WorkoutSet::new(session_id, squat.id, 1, 100.0, 5), date())
            .unwrap();
        assert!(matches!(
            store.delete_exercise(squat.id),
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_sessions_for_date() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());

        store
            .insert_session(&WorkoutSession::new(user_id, date()))
            .unwrap();
        let other_day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        store
            .insert_session(&WorkoutSession::new(user_id, other_day))
            .unwrap();

        assert_eq!(store.sessions_for_date(user_id, date()).unwrap().len(), 1);
        assert_eq!(store.sessions_for_date(user_id, other_day).unwrap().len(), 1);
    }

    #[test]
    fn test_add_set_updates_session_and_records() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let squat = store.get_exercise_by_name("Barbell Squat").unwrap().unwrap();
        let session_id = store
            .insert_session(&WorkoutSession::new(user_id, date()))
            .unwrap();

        let set = WorkoutSet::new(session_id, squat.id, 1, 100.0, 5);
        let stored = store.add_set(user_id, &set, date()).unwrap();

        assert_eq!(stored.volume, 500.0);
        assert_eq!(stored.estimated_one_rm, Some(114.6));

        let session = store.get_session(session_id).unwrap().unwrap();
        assert_eq!(session.total_volume, 500.0);
        assert_eq!(session.total_sets, 1);

        let records = store.list_records(user_id, squat.id).unwrap();
        assert_eq!(records.len(), 4);

        let max_weight = store
            .get_record(user_id, squat.id, RecordType::MaxWeight)
            .unwrap()
            .unwrap();
        assert_eq!(max_weight.value, 100.0);
        assert_eq!(max_weight.reps, Some(5));
    }

    #[test]
    fn test_record_keeps_best_value() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let squat = store.get_exercise_by_name("Barbell Squat").unwrap().unwrap();
        let session_id = store
            .insert_session(&WorkoutSession::new(user_id, date()))
            .unwrap();

        store
            .add_set(user_id, &WorkoutSet::new(session_id, squat.id, 1, 100.0, 5), date())
            .unwrap();
        // Lighter set must not downgrade the record
        store
            .add_set(user_id, &WorkoutSet::new(session_id, squat.id, 2, 80.0, 5), date())
            .unwrap();

        let record = store
            .get_record(user_id, squat.id, RecordType::MaxWeight)
            .unwrap()
            .unwrap();
        assert_eq!(record.value, 100.0);

        // Heavier set upgrades it
        store
            .add_set(user_id, &WorkoutSet::new(session_id, squat.id, 3, 110.0, 3), date())
            .unwrap();
        let record = store
            .get_record(user_id, squat.id, RecordType::MaxWeight)
            .unwrap()
            .unwrap();
        assert_eq!(record.value, 110.0);
        assert_eq!(record.reps, Some(3));
    }

    #[test]
    fn test_recent_volumes_oldest_first() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());

        for (i, volume) in [1000.0, 850.0, 700.0].iter().enumerate() {
            let mut session = WorkoutSession::new(user_id, date());
            session.started_at = Utc::now() + chrono::Duration::minutes(i as i64);
            session.total_volume = *volume;
            store.insert_session(&session).unwrap();
        }

        let volumes = store.recent_session_volumes(user_id, 5).unwrap();
        assert_eq!(volumes, vec![1000.0, 850.0, 700.0]);
        assert!(analyzer::should_deload(&volumes));
    }

    #[test]
    fn test_delete_session_cascades_sets() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let squat = store.get_exercise_by_name("Barbell Squat").unwrap().unwrap();
        let session_id = store
            .insert_session(&WorkoutSession::new(user_id, date()))
            .unwrap();
        store
            .add_set(user_id, &WorkoutSet::new(session_id, squat.id, 1, 100.0, 5), date())
            .unwrap();

        store.delete_session(session_id).unwrap();
        assert!(store.get_session(session_id).unwrap().is_none());
        assert!(store.list_sets(session_id).unwrap().is_empty());
    }

    #[test]
    fn test_template_roundtrip() {
        let (db, user_id) = setup();
        let store = WorkoutStore::new(db.connection());
        store.seed_default_exercises().unwrap();

        let squat = store.get_exercise_by_name("Barbell Squat").unwrap().unwrap();
        let bench = store.get_exercise_by_name("Bench Press").unwrap().unwrap();

        let mut template = WorkoutTemplate {
            id: 0,
            user_id,
            name: "Push Day".to_string(),
            description: Some("Squat and bench".to_string()),
            exercise_ids: vec![squat.id, bench.id],
            created_at: Utc::now(),
        };
        template.id = store.insert_template(&template).unwrap();

        let templates = store.list_templates(user_id).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Push Day");
        assert_eq!(templates[0].exercise_ids, vec![squat.id, bench.id]);

        store.delete_template(template.id).unwrap();
        assert!(store.list_templates(user_id).unwrap().is_empty());
    }
}
