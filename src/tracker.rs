//! High-level tracking service tying accounts, storage, and analysis together.
//!
//! Owns the [`Database`] and exposes one operation per user-facing action.
//! Weights cross this boundary in the caller's unit and are converted to
//! kilograms before they reach storage.

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::account::{self, AccountError, User};
use crate::nutrition::calculator;
use crate::nutrition::types::{
    ActivityLevel, DailyNutritionSummary, Food, Meal, MealType, NutritionGoal, NutritionProfile,
    Sex,
};
use crate::storage::database::{Database, DatabaseError};
use crate::storage::nutrition_store::NutritionStore;
use crate::storage::workout_store::WorkoutStore;
use crate::tracking::types::{WeightEntry, WeightTrendReport};
use crate::tracking::{sample, stats};
use crate::units::{self, Unit};
use crate::workouts::analyzer;
use crate::workouts::types::{
    Exercise, PersonalRecord, SetMetrics, WorkoutSession, WorkoutSet, WorkoutTemplate,
};

/// Errors surfaced by the tracking service.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("invalid weight: {0}")]
    InvalidWeight(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Application service over a single database.
pub struct Tracker {
    db: Database,
}

impl Tracker {
    /// Open the tracker against a database file, creating it if needed.
    pub fn open(path: &std::path::PathBuf) -> Result<Self, TrackerError> {
        let db = Database::open(path)?;
        let tracker = Self { db };
        tracker.workouts().seed_default_exercises()?;
        Ok(tracker)
    }

    /// In-memory tracker for tests.
    pub fn open_in_memory() -> Result<Self, TrackerError> {
        let db = Database::open_in_memory()?;
        let tracker = Self { db };
        tracker.workouts().seed_default_exercises()?;
        Ok(tracker)
    }

    /// Direct access to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn nutrition(&self) -> NutritionStore<'_> {
        NutritionStore::new(self.db.connection())
    }

    fn workouts(&self) -> WorkoutStore<'_> {
        WorkoutStore::new(self.db.connection())
    }

    // ========== Accounts ==========

    /// Register a new user. The goal weight is given in `unit` and stored
    /// in kilograms.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        goal_weight: f64,
        unit: Unit,
        phone: &str,
    ) -> Result<User, TrackerError> {
        if self.db.get_user_by_username(username)?.is_some() {
            return Err(AccountError::UsernameTaken(username.to_string()).into());
        }

        let goal_kg = units::convert(goal_weight, unit, Unit::Kg);
        let mut user = account::register(username, password, goal_kg, phone)?;
        user.preferred_unit = unit;

        user.id = self.db.insert_user(&user)?;
        tracing::info!(username = %user.username, "registered new user");
        Ok(user)
    }

    /// Look up a user and verify their password.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<User, TrackerError> {
        let user = self
            .db
            .get_user_by_username(username)?
            .ok_or(AccountError::InvalidCredentials)?;

        account::authenticate(&user, password)?;
        tracing::debug!(username = %user.username, "login succeeded");
        Ok(user)
    }

    /// Change a user's password after verifying the current one.
    pub fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), TrackerError> {
        let user = self
            .db
            .get_user(user_id)?
            .ok_or_else(|| TrackerError::NotFound(format!("User {}", user_id)))?;

        account::authenticate(&user, current_password)?;
        account::validation::validate_password(new_password)?;

        let hash = account::password::hash_password(new_password)?;
        self.db.update_password_hash(user_id, &hash)?;
        Ok(())
    }

    /// Update a user's goal weight, given in `unit`.
    pub fn set_goal_weight(
        &self,
        user_id: i64,
        goal_weight: f64,
        unit: Unit,
    ) -> Result<(), TrackerError> {
        let goal_kg = units::convert(goal_weight, unit, Unit::Kg);
        account::validation::validate_goal_weight(goal_kg)?;
        self.db.update_goal_weight(user_id, goal_kg)?;
        Ok(())
    }

    /// Update a user's preferred display unit.
    pub fn set_preferred_unit(&self, user_id: i64, unit: Unit) -> Result<(), TrackerError> {
        self.db.update_preferred_unit(user_id, unit)?;
        Ok(())
    }

    /// Update a user's phone number (stored cleaned to 10 digits).
    pub fn set_phone_number(&self, user_id: i64, phone: &str) -> Result<(), TrackerError> {
        let cleaned = account::validation::validate_phone(phone)?;
        self.db.update_phone_number(user_id, &cleaned)?;
        Ok(())
    }

    /// Fetch a user by ID.
    pub fn get_user(&self, user_id: i64) -> Result<User, TrackerError> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| TrackerError::NotFound(format!("User {}", user_id)))
    }

    // ========== Weight Tracking ==========

    /// Log a weight measurement, given in `unit`, timestamped now.
    pub fn log_weight(
        &self,
        user_id: i64,
        weight: f64,
        unit: Unit,
    ) -> Result<WeightEntry, TrackerError> {
        if !units::is_valid_weight(weight, unit) {
            return Err(TrackerError::InvalidWeight(format!(
                "{} is outside the plausible range for {}",
                weight, unit
            )));
        }

        let weight_kg = units::convert(weight, unit, Unit::Kg);
        let mut entry = WeightEntry::new(user_id, weight_kg, Utc::now());
        entry.id = self.db.insert_weight_entry(&entry)?;

        tracing::debug!(user_id, weight_kg, "logged weight entry");
        Ok(entry)
    }

    /// A user's complete weight history, oldest first.
    pub fn weight_history(&self, user_id: i64) -> Result<Vec<WeightEntry>, TrackerError> {
        Ok(self.db.list_weight_entries(user_id)?)
    }

    /// The most recent logged weight, in kg.
    pub fn current_weight(&self, user_id: i64) -> Result<Option<f64>, TrackerError> {
        Ok(self.db.latest_weight_entry(user_id)?.map(|e| e.weight_kg))
    }

    /// Remove a logged entry.
    pub fn delete_weight_entry(&self, entry_id: i64) -> Result<(), TrackerError> {
        Ok(self.db.delete_weight_entry(entry_id)?)
    }

    /// Full trend analysis against the user's goal weight.
    ///
    /// Returns None when the user has no history yet.
    pub fn trend_report(&self, user_id: i64) -> Result<Option<WeightTrendReport>, TrackerError> {
        let user = self.get_user(user_id)?;
        let entries = self.db.list_weight_entries(user_id)?;
        Ok(stats::analyze(&entries, user.goal_weight_kg))
    }

    /// Seed thirty days of plausible demo entries for a user.
    pub fn seed_demo_data(&self, user_id: i64) -> Result<usize, TrackerError> {
        let entries = sample::generate_demo_data(user_id);
        for entry in &entries {
            self.db.insert_weight_entry(entry)?;
        }
        tracing::info!(user_id, count = entries.len(), "seeded demo weight data");
        Ok(entries.len())
    }

    // ========== Nutrition ==========

    /// Calculate the nutrition profile from the user's latest weight and
    /// goal weight, persist it as their nutrition goal, and return it.
    pub fn calculate_nutrition(
        &self,
        user_id: i64,
        height_cm: f64,
        age: u32,
        sex: Sex,
        activity: ActivityLevel,
    ) -> Result<NutritionProfile, TrackerError> {
        let user = self.get_user(user_id)?;
        let weight_kg = self
            .current_weight(user_id)?
            .ok_or_else(|| TrackerError::NotFound("no weight entries logged yet".to_string()))?;

        let goal = calculator::goal_for_target(weight_kg, user.goal_weight_kg);
        let profile = calculator::profile(weight_kg, height_cm, age, sex, activity, goal);

        let stored = NutritionGoal {
            id: 0,
            user_id,
            height_cm,
            age,
            sex,
            activity_level: activity,
            goal,
            bmr: profile.bmr,
            tdee: profile.tdee,
            calorie_target: profile.calorie_target,
            protein_target: profile.macros.protein_g,
            carbs_target: profile.macros.carbs_g,
            fats_target: profile.macros.fats_g,
            water_target: profile.water_liters,
            calculated_at: Utc::now(),
        };
        self.nutrition().save_goal(&stored)?;

        Ok(profile)
    }

    /// The stored nutrition goal, if one has been calculated.
    pub fn nutrition_goal(&self, user_id: i64) -> Result<Option<NutritionGoal>, TrackerError> {
        Ok(self.nutrition().get_goal(user_id)?)
    }

    /// Add a food to the catalog.
    pub fn add_food(&self, food: &Food) -> Result<i64, TrackerError> {
        Ok(self.nutrition().insert_food(food)?)
    }

    /// Search the food catalog by name.
    pub fn search_foods(&self, query: &str) -> Result<Vec<Food>, TrackerError> {
        Ok(self.nutrition().search_foods(query)?)
    }

    /// Log a meal from (food_id, servings) pairs and refresh the day's
    /// summary.
    pub fn log_meal(
        &self,
        user_id: i64,
        meal_type: MealType,
        date: NaiveDate,
        foods: &[(i64, f64)],
    ) -> Result<Meal, TrackerError> {
        let store = self.nutrition();
        let meal_id = store.insert_meal(&Meal::new(user_id, meal_type, date))?;

        for &(food_id, servings) in foods {
            let food = store
                .get_food(food_id)?
                .ok_or_else(|| TrackerError::NotFound(format!("Food {}", food_id)))?;
            store.add_food_to_meal(meal_id, &food, servings)?;
        }

        store.refresh_daily_summary(user_id, date)?;

        store
            .get_meal(meal_id)?
            .ok_or_else(|| TrackerError::NotFound(format!("Meal {}", meal_id)))
    }

    /// Meals logged on one calendar day.
    pub fn meals_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Meal>, TrackerError> {
        Ok(self.nutrition().list_meals_for_date(user_id, date)?)
    }

    /// The aggregated nutrition summary for one day, if any meals were
    /// logged.
    pub fn daily_summary(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<DailyNutritionSummary>, TrackerError> {
        Ok(self.nutrition().get_daily_summary(user_id, date)?)
    }

    // ========== Workouts ==========

    /// Look up an exercise by name, case-insensitive.
    pub fn find_exercise(&self, name: &str) -> Result<Option<Exercise>, TrackerError> {
        Ok(self.workouts().get_exercise_by_name(name)?)
    }

    /// List exercises, optionally filtered by category.
    pub fn list_exercises(&self, category: Option<&str>) -> Result<Vec<Exercise>, TrackerError> {
        Ok(self.workouts().list_exercises(category)?)
    }

    /// Add a custom exercise for a user.
    pub fn add_exercise(
        &self,
        user_id: i64,
        name: &str,
        category: &str,
    ) -> Result<Exercise, TrackerError> {
        let mut exercise = Exercise::new(name, category);
        exercise.is_custom = true;
        exercise.user_id = Some(user_id);
        exercise.id = self.workouts().insert_exercise(&exercise)?;
        Ok(exercise)
    }

    /// Start a workout session for today.
    pub fn start_session(&self, user_id: i64, date: NaiveDate) -> Result<WorkoutSession, TrackerError> {
        let mut session = WorkoutSession::new(user_id, date);
        session.id = self.workouts().insert_session(&session)?;
        Ok(session)
    }

    /// Record a set and analyze it against the previous session's volume
    /// and the user's current body weight.
    pub fn record_set(
        &self,
        user_id: i64,
        session_id: i64,
        exercise_id: i64,
        set_number: u32,
        weight_kg: f64,
        reps: u32,
    ) -> Result<(WorkoutSet, SetMetrics), TrackerError> {
        let store = self.workouts();

        let session = store
            .get_session(session_id)?
            .ok_or_else(|| TrackerError::NotFound(format!("Session {}", session_id)))?;

        // Volume of the most recent session before this one, 0 when this
        // is the first workout
        let previous_volume = store
            .list_sessions(user_id, Some(2))?
            .into_iter()
            .find(|s| s.id != session_id)
            .map(|s| s.total_volume)
            .unwrap_or(0.0);

        let body_weight = self.current_weight(user_id)?.unwrap_or(0.0);

        let set = WorkoutSet::new(session_id, exercise_id, set_number, weight_kg, reps);
        let stored = store.add_set(user_id, &set, session.date)?;

        let metrics = analyzer::analyze_set(weight_kg, reps, body_weight, previous_volume);
        Ok((stored, metrics))
    }

    /// Sessions logged on one calendar day.
    pub fn sessions_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<WorkoutSession>, TrackerError> {
        Ok(self.workouts().sessions_for_date(user_id, date)?)
    }

    /// Sets recorded in one session, in order.
    pub fn session_sets(&self, session_id: i64) -> Result<Vec<WorkoutSet>, TrackerError> {
        Ok(self.workouts().list_sets(session_id)?)
    }

    /// A user's workout sessions, most recent first.
    pub fn workout_history(
        &self,
        user_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<WorkoutSession>, TrackerError> {
        Ok(self.workouts().list_sessions(user_id, limit)?)
    }

    /// Personal records for one exercise.
    pub fn personal_records(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Vec<PersonalRecord>, TrackerError> {
        Ok(self.workouts().list_records(user_id, exercise_id)?)
    }

    /// Whether the user's recent volume history suggests a deload week.
    pub fn deload_recommended(&self, user_id: i64) -> Result<bool, TrackerError> {
        let volumes = self.workouts().recent_session_volumes(user_id, 5)?;
        Ok(analyzer::should_deload(&volumes))
    }

    /// Save a reusable workout template.
    pub fn save_template(
        &self,
        user_id: i64,
        name: &str,
        exercise_ids: Vec<i64>,
    ) -> Result<WorkoutTemplate, TrackerError> {
        let mut template = WorkoutTemplate {
            id: 0,
            user_id,
            name: name.to_string(),
            description: None,
            exercise_ids,
            created_at: Utc::now(),
        };
        template.id = self.workouts().insert_template(&template)?;
        Ok(template)
    }

    /// A user's saved templates, newest first.
    pub fn list_templates(&self, user_id: i64) -> Result<Vec<WorkoutTemplate>, TrackerError> {
        Ok(self.workouts().list_templates(user_id)?)
    }
}
