//! Nutrition data storage operations.
//!
//! Provides persistence for:
//! - Food catalog (built-in and custom foods)
//! - Logged meals and their foods
//! - Daily nutrition summaries
//! - Calculated nutrition goals

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::nutrition::types::{
    ActivityLevel, DailyNutritionSummary, Food, GoalType, Meal, MealFood, MealType, NutritionGoal,
    Sex,
};
use crate::storage::database::{parse_timestamp, DatabaseError};

/// Nutrition store for foods, meals, and goals.
pub struct NutritionStore<'a> {
    conn: &'a Connection,
}

impl<'a> NutritionStore<'a> {
    /// Create a new nutrition store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Food Catalog ==========

    /// Insert a food, returning the assigned rowid.
    pub fn insert_food(&self, food: &Food) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO foods (name, brand, serving_size_g, calories, protein, carbs,
                 fats, fiber, sugar, category, is_custom, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    food.name,
                    food.brand,
                    food.serving_size_g,
                    food.calories,
                    food.protein,
                    food.carbs,
                    food.fats,
                    food.fiber,
                    food.sugar,
                    food.category,
                    food.is_custom as i32,
                    food.user_id,
                    food.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get a food by ID.
    pub fn get_food(&self, id: i64) -> Result<Option<Food>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, brand, serving_size_g, calories, protein, carbs, fats,
                 fiber, sugar, category, is_custom, user_id, created_at
                 FROM foods WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id], Self::map_food_row);

        match result {
            Ok(row) => Ok(Some(row.into_food()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Search foods by name, case-insensitive substring match.
    pub fn search_foods(&self, query: &str) -> Result<Vec<Food>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, brand, serving_size_g, calories, protein, carbs, fats,
                 fiber, sugar, category, is_custom, user_id, created_at
                 FROM foods WHERE name LIKE ?1 ORDER BY name ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let pattern = format!("%{}%", query);
        let rows = stmt
            .query_map(params![pattern], Self::map_food_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut foods = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            foods.push(row.into_food()?);
        }

        Ok(foods)
    }

    /// List foods in a category, alphabetically.
    pub fn list_foods_by_category(&self, category: &str) -> Result<Vec<Food>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, brand, serving_size_g, calories, protein, carbs, fats,
                 fiber, sugar, category, is_custom, user_id, created_at
                 FROM foods WHERE category = ?1 ORDER BY name ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![category], Self::map_food_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut foods = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            foods.push(row.into_food()?);
        }

        Ok(foods)
    }

    /// List a user's custom foods, alphabetically.
    pub fn list_custom_foods(&self, user_id: i64) -> Result<Vec<Food>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, brand, serving_size_g, calories, protein, carbs, fats,
                 fiber, sugar, category, is_custom, user_id, created_at
                 FROM foods WHERE is_custom = 1 AND user_id = ?1 ORDER BY name ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], Self::map_food_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut foods = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            foods.push(row.into_food()?);
        }

        Ok(foods)
    }

    fn map_food_row(row: &rusqlite::Row) -> rusqlite::Result<FoodRow> {
        Ok(FoodRow {
            id: row.get(0)?,
            name: row.get(1)?,
            brand: row.get(2)?,
            serving_size_g: row.get(3)?,
            calories: row.get(4)?,
            protein: row.get(5)?,
            carbs: row.get(6)?,
            fats: row.get(7)?,
            fiber: row.get(8)?,
            sugar: row.get(9)?,
            category: row.get(10)?,
            is_custom: row.get(11)?,
            user_id: row.get(12)?,
            created_at: row.get(13)?,
        })
    }

    /// Delete a custom food. Fails with a constraint error when the food is
    /// referenced by a logged meal.
    pub fn delete_food(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id])
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::ConstraintViolation(format!(
                        "food {} is referenced by logged meals",
                        id
                    ))
                }
                e => DatabaseError::QueryFailed(e.to_string()),
            })?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Food {}", id)));
        }

        Ok(())
    }

    // ========== Meals ==========

    /// Insert a meal, returning the assigned rowid.
    pub fn insert_meal(&self, meal: &Meal) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO meals (user_id, meal_type, date, logged_at, notes,
                 total_calories, total_protein, total_carbs, total_fats)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    meal.user_id,
                    meal.meal_type.as_str(),
                    meal.date.to_string(),
                    meal.logged_at.to_rfc3339(),
                    meal.notes,
                    meal.total_calories,
                    meal.total_protein,
                    meal.total_carbs,
                    meal.total_fats,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Attach a food to a meal and fold its nutrients into the meal totals.
    pub fn add_food_to_meal(
        &self,
        meal_id: i64,
        food: &Food,
        servings: f64,
    ) -> Result<MealFood, DatabaseError> {
        let grams = food.serving_size_g * servings;

        self.conn
            .execute(
                "INSERT INTO meal_foods (meal_id, food_id, servings, grams_consumed)
                 VALUES (?1, ?2, ?3, ?4)",
                params![meal_id, food.id, servings, grams],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let id = self.conn.last_insert_rowid();

        let rows_affected = self
            .conn
            .execute(
                "UPDATE meals SET
                 total_calories = total_calories + ?2,
                 total_protein = total_protein + ?3,
                 total_carbs = total_carbs + ?4,
                 total_fats = total_fats + ?5
                 WHERE id = ?1",
                params![
                    meal_id,
                    food.calories * servings,
                    food.protein * servings,
                    food.carbs * servings,
                    food.fats * servings,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Meal {}", meal_id)));
        }

        Ok(MealFood {
            id,
            meal_id,
            food_id: food.id,
            servings,
            grams_consumed: grams,
        })
    }

    /// Get a meal by ID.
    pub fn get_meal(&self, id: i64) -> Result<Option<Meal>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, meal_type, date, logged_at, notes, total_calories,
                 total_protein, total_carbs, total_fats FROM meals WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![id], Self::map_meal_row);

        match result {
            Ok(row) => Ok(Some(row.into_meal()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// List a user's meals for one calendar day, in logging order.
    pub fn list_meals_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Meal>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, meal_type, date, logged_at, notes, total_calories,
                 total_protein, total_carbs, total_fats FROM meals
                 WHERE user_id = ?1 AND date = ?2 ORDER BY logged_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, date.to_string()], Self::map_meal_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut meals = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            meals.push(row.into_meal()?);
        }

        Ok(meals)
    }

    fn map_meal_row(row: &rusqlite::Row) -> rusqlite::Result<MealRow> {
        Ok(MealRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            meal_type: row.get(2)?,
            date: row.get(3)?,
            logged_at: row.get(4)?,
            notes: row.get(5)?,
            total_calories: row.get(6)?,
            total_protein: row.get(7)?,
            total_carbs: row.get(8)?,
            total_fats: row.get(9)?,
        })
    }

    /// List the foods attached to a meal.
    pub fn list_meal_foods(&self, meal_id: i64) -> Result<Vec<MealFood>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, meal_id, food_id, servings, grams_consumed
                 FROM meal_foods WHERE meal_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![meal_id], |row| {
                Ok(MealFood {
                    id: row.get(0)?,
                    meal_id: row.get(1)?,
                    food_id: row.get(2)?,
                    servings: row.get(3)?,
                    grams_consumed: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut foods = Vec::new();
        for row in rows {
            foods.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(foods)
    }

    /// Detach a food from a meal and subtract its nutrients from the totals.
    pub fn remove_food_from_meal(&self, meal_food_id: i64) -> Result<(), DatabaseError> {
        let result = self.conn.query_row(
            "SELECT mf.meal_id, mf.servings, f.calories, f.protein, f.carbs, f.fats
             FROM meal_foods mf JOIN foods f ON f.id = mf.food_id
             WHERE mf.id = ?1",
            params![meal_food_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                ))
            },
        );

        let (meal_id, servings, calories, protein, carbs, fats) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(DatabaseError::NotFound(format!(
                    "Meal food {}",
                    meal_food_id
                )))
            }
            Err(e) => return Err(DatabaseError::QueryFailed(e.to_string())),
        };

        self.conn
            .execute(
                "DELETE FROM meal_foods WHERE id = ?1",
                params![meal_food_id],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        self.conn
            .execute(
                "UPDATE meals SET
                 total_calories = total_calories - ?2,
                 total_protein = total_protein - ?3,
                 total_carbs = total_carbs - ?4,
                 total_fats = total_fats - ?5
                 WHERE id = ?1",
                params![
                    meal_id,
                    calories * servings,
                    protein * servings,
                    carbs * servings,
                    fats * servings,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Delete a meal by ID (cascades to its meal_foods rows).
    pub fn delete_meal(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM meals WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Meal {}", id)));
        }

        Ok(())
    }

    // ========== Daily Summaries ==========

    /// Recompute and persist the daily summary from logged meals.
    pub fn refresh_daily_summary(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<DailyNutritionSummary, DatabaseError> {
        let meals = self.list_meals_for_date(user_id, date)?;

        let total_calories: f64 = meals.iter().map(|m| m.total_calories).sum();
        let total_protein: f64 = meals.iter().map(|m| m.total_protein).sum();
        let total_carbs: f64 = meals.iter().map(|m| m.total_carbs).sum();
        let total_fats: f64 = meals.iter().map(|m| m.total_fats).sum();
        let meals_logged = meals.len() as u32;
        let now = Utc::now();

        self.conn
            .execute(
                "INSERT INTO daily_nutrition_summary
                 (user_id, date, total_calories, total_protein, total_carbs, total_fats,
                  meals_logged, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id, date) DO UPDATE SET
                    total_calories = excluded.total_calories,
                    total_protein = excluded.total_protein,
                    total_carbs = excluded.total_carbs,
                    total_fats = excluded.total_fats,
                    meals_logged = excluded.meals_logged,
                    last_updated = excluded.last_updated",
                params![
                    user_id,
                    date.to_string(),
                    total_calories,
                    total_protein,
                    total_carbs,
                    total_fats,
                    meals_logged,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        self.get_daily_summary(user_id, date)?
            .ok_or_else(|| DatabaseError::NotFound(format!("Summary for {}", date)))
    }

    /// Get the daily summary for a user-day, if one has been computed.
    pub fn get_daily_summary(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<DailyNutritionSummary>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, user_id, date, total_calories, total_protein, total_carbs,
             total_fats, meals_logged, last_updated
             FROM daily_nutrition_summary WHERE user_id = ?1 AND date = ?2",
            params![user_id, date.to_string()],
            |row| {
                Ok(SummaryRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    date: row.get(2)?,
                    total_calories: row.get(3)?,
                    total_protein: row.get(4)?,
                    total_carbs: row.get(5)?,
                    total_fats: row.get(6)?,
                    meals_logged: row.get(7)?,
                    last_updated: row.get(8)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_summary()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Daily summaries in a date range, ascending.
    pub fn summaries_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyNutritionSummary>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, date, total_calories, total_protein, total_carbs,
                 total_fats, meals_logged, last_updated
                 FROM daily_nutrition_summary
                 WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 ORDER BY date ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![user_id, from.to_string(), to.to_string()],
                |row| {
                    Ok(SummaryRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        date: row.get(2)?,
                        total_calories: row.get(3)?,
                        total_protein: row.get(4)?,
                        total_carbs: row.get(5)?,
                        total_fats: row.get(6)?,
                        meals_logged: row.get(7)?,
                        last_updated: row.get(8)?,
                    })
                },
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut summaries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            summaries.push(row.into_summary()?);
        }

        Ok(summaries)
    }

    /// Average daily calories over the summaries in a date range, None when
    /// no days were logged.
    pub fn average_calories_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<f64>, DatabaseError> {
        let summaries = self.summaries_between(user_id, from, to)?;
        if summaries.is_empty() {
            return Ok(None);
        }

        let total: f64 = summaries.iter().map(|s| s.total_calories).sum();
        Ok(Some(total / summaries.len() as f64))
    }

    // ========== Nutrition Goals ==========

    /// Save the calculated nutrition goal for a user, replacing any previous one.
    pub fn save_goal(&self, goal: &NutritionGoal) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO nutrition_goals
                 (user_id, height_cm, age, sex, activity_level, goal, bmr, tdee,
                  calorie_target, protein_target, carbs_target, fats_target,
                  water_target, calculated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(user_id) DO UPDATE SET
                    height_cm = excluded.height_cm,
                    age = excluded.age,
                    sex = excluded.sex,
                    activity_level = excluded.activity_level,
                    goal = excluded.goal,
                    bmr = excluded.bmr,
                    tdee = excluded.tdee,
                    calorie_target = excluded.calorie_target,
                    protein_target = excluded.protein_target,
                    carbs_target = excluded.carbs_target,
                    fats_target = excluded.fats_target,
                    water_target = excluded.water_target,
                    calculated_at = excluded.calculated_at",
                params![
                    goal.user_id,
                    goal.height_cm,
                    goal.age,
                    serde_label(&goal.sex)?,
                    serde_label(&goal.activity_level)?,
                    serde_label(&goal.goal)?,
                    goal.bmr,
                    goal.tdee,
                    goal.calorie_target,
                    goal.protein_target,
                    goal.carbs_target,
                    goal.fats_target,
                    goal.water_target,
                    goal.calculated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get the stored nutrition goal for a user.
    pub fn get_goal(&self, user_id: i64) -> Result<Option<NutritionGoal>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, user_id, height_cm, age, sex, activity_level, goal, bmr, tdee,
             calorie_target, protein_target, carbs_target, fats_target, water_target,
             calculated_at
             FROM nutrition_goals WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(GoalRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    height_cm: row.get(2)?,
                    age: row.get(3)?,
                    sex: row.get(4)?,
                    activity_level: row.get(5)?,
                    goal: row.get(6)?,
                    bmr: row.get(7)?,
                    tdee: row.get(8)?,
                    calorie_target: row.get(9)?,
                    protein_target: row.get(10)?,
                    carbs_target: row.get(11)?,
                    fats_target: row.get(12)?,
                    water_target: row.get(13)?,
                    calculated_at: row.get(14)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_goal()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }
}

/// Serialize a plain enum to its serde string label (no quotes).
fn serde_label<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    let json =
        serde_json::to_string(value).map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    Ok(json.trim_matches('"').to_string())
}

/// Parse a serde string label back into a plain enum.
fn parse_label<T: serde::de::DeserializeOwned>(label: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(&format!("\"{}\"", label))
        .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}

/// Intermediate struct for reading food rows from the database.
struct FoodRow {
    id: i64,
    name: String,
    brand: Option<String>,
    serving_size_g: f64,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    fiber: f64,
    sugar: f64,
    category: Option<String>,
    is_custom: i32,
    user_id: Option<i64>,
    created_at: String,
}

impl FoodRow {
    fn into_food(self) -> Result<Food, DatabaseError> {
        Ok(Food {
            id: self.id,
            name: self.name,
            brand: self.brand,
            serving_size_g: self.serving_size_g,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            fiber: self.fiber,
            sugar: self.sugar,
            category: self.category,
            is_custom: self.is_custom != 0,
            user_id: self.user_id,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Intermediate struct for reading meal rows from the database.
struct MealRow {
    id: i64,
    user_id: i64,
    meal_type: String,
    date: String,
    logged_at: String,
    notes: Option<String>,
    total_calories: f64,
    total_protein: f64,
    total_carbs: f64,
    total_fats: f64,
}

impl MealRow {
    fn into_meal(self) -> Result<Meal, DatabaseError> {
        let meal_type = MealType::parse(&self.meal_type).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown meal type: {}", self.meal_type))
        })?;

        Ok(Meal {
            id: self.id,
            user_id: self.user_id,
            meal_type,
            date: parse_date(&self.date)?,
            logged_at: parse_timestamp(&self.logged_at)?,
            notes: self.notes,
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fats: self.total_fats,
        })
    }
}

/// Intermediate struct for reading daily summary rows from the database.
struct SummaryRow {
    id: i64,
    user_id: i64,
    date: String,
    total_calories: f64,
    total_protein: f64,
    total_carbs: f64,
    total_fats: f64,
    meals_logged: u32,
    last_updated: String,
}

impl SummaryRow {
    fn into_summary(self) -> Result<DailyNutritionSummary, DatabaseError> {
        Ok(DailyNutritionSummary {
            id: self.id,
            user_id: self.user_id,
            date: parse_date(&self.date)?,
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fats: self.total_fats,
            meals_logged: self.meals_logged,
            last_updated: parse_timestamp(&self.last_updated)?,
        })
    }
}

/// Intermediate struct for reading nutrition goal rows from the database.
struct GoalRow {
    id: i64,
    user_id: i64,
    height_cm: f64,
    age: u32,
    sex: String,
    activity_level: String,
    goal: String,
    bmr: f64,
    tdee: f64,
    calorie_target: f64,
    protein_target: f64,
    carbs_target: f64,
    fats_target: f64,
    water_target: f64,
    calculated_at: String,
}

impl GoalRow {
    fn into_goal(self) -> Result<NutritionGoal, DatabaseError> {
        let sex: Sex = parse_label(&self.sex)?;
        let activity_level: ActivityLevel = parse_label(&self.activity_level)?;
        let goal: GoalType = parse_label(&self.goal)?;

        Ok(NutritionGoal {
            id: self.id,
            user_id: self.user_id,
            height_cm: self.height_cm,
            age: self.age,
            sex,
            activity_level,
            goal,
            bmr: self.bmr,
            tdee: self.tdee,
            calorie_target: self.calorie_target,
            protein_target: self.protein_target,
            carbs_target: self.carbs_target,
            fats_target: self.fats_target,
            water_target: self.water_target,
            calculated_at: parse_timestamp(&self.calculated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::User;
    use crate::storage::database::Database;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user_id = db
            .insert_user(&User::new("alice_99", "100000$ab$cd", 75.0, "5551234567"))
            .unwrap();
        (db, user_id)
    }

    fn oats() -> Food {
        let mut food = Food::new("Rolled Oats", 40.0, 150.0);
        food.protein = 5.0;
        food.carbs = 27.0;
        food.fats = 2.5;
        food.fiber = 4.0;
        food
    }

    #[test]
    fn test_food_insert_and_search() {
        let (db, _) = setup();
        let store = NutritionStore::new(db.connection());

        let id = store.insert_food(&oats()).unwrap();
        assert!(id > 0);

        let found = store.search_foods("oats").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rolled Oats");
        assert_eq!(found[0].protein, 5.0);

        assert!(store.search_foods("pizza").unwrap().is_empty());
    }

    #[test]
    fn test_meal_totals_accumulate() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut food = oats();
        food.id = store.insert_food(&food).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let meal_id = store
            .insert_meal(&Meal::new(user_id, MealType::Breakfast, date))
            .unwrap();

        store.add_food_to_meal(meal_id, &food, 2.0).unwrap();

        let meal = store.get_meal(meal_id).unwrap().unwrap();
        assert_eq!(meal.total_calories, 300.0);
        assert_eq!(meal.total_protein, 10.0);
        assert_eq!(meal.total_carbs, 54.0);

        let attached = store.list_meal_foods(meal_id).unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].grams_consumed, 80.0);
    }

    #[test]
    fn test_daily_summary_refresh() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut food = oats();
        food.id = store.insert_food(&food).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let breakfast = store
            .insert_meal(&Meal::new(user_id, MealType::Breakfast, date))
            .unwrap();
        let lunch = store
            .insert_meal(&Meal::new(user_id, MealType::Lunch, date))
            .unwrap();

        store.add_food_to_meal(breakfast, &food, 1.0).unwrap();
        store.add_food_to_meal(lunch, &food, 2.0).unwrap();

        let summary = store.refresh_daily_summary(user_id, date).unwrap();
        assert_eq!(summary.total_calories, 450.0);
        assert_eq!(summary.meals_logged, 2);

        // Refresh again, the row is replaced not duplicated
        let again = store.refresh_daily_summary(user_id, date).unwrap();
        assert_eq!(again.total_calories, 450.0);
        assert_eq!(again.id, summary.id);
    }

    #[test]
    fn test_summary_missing_day() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(store.get_daily_summary(user_id, date).unwrap().is_none());
    }

    #[test]
    fn test_goal_upsert_roundtrip() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let goal = NutritionGoal {
            id: 0,
            user_id,
            height_cm: 180.0,
            age: 30,
            sex: Sex::Male,
            activity_level: ActivityLevel::Moderate,
            goal: GoalType::Cutting,
            bmr: 1780.0,
            tdee: 2759.0,
            calorie_target: 2259.0,
            protein_target: 176.0,
            carbs_target: 169.0,
            fats_target: 75.0,
            water_target: 2.6,
            calculated_at: Utc::now(),
        };

        store.save_goal(&goal).unwrap();

        let stored = store.get_goal(user_id).unwrap().unwrap();
        assert_eq!(stored.sex, Sex::Male);
        assert_eq!(stored.activity_level, ActivityLevel::Moderate);
        assert_eq!(stored.goal, GoalType::Cutting);
        assert_eq!(stored.calorie_target, 2259.0);

        // Re-save with a different goal replaces the row
        let updated = NutritionGoal {
            goal: GoalType::Maintenance,
            calorie_target: 2759.0,
            ..goal
        };
        store.save_goal(&updated).unwrap();

        let stored = store.get_goal(user_id).unwrap().unwrap();
        assert_eq!(stored.goal, GoalType::Maintenance);
        assert_eq!(stored.calorie_target, 2759.0);
    }

    #[test]
    fn test_remove_food_restores_totals() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut food = oats();
        food.id = store.insert_food(&food).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let meal_id = store
            .insert_meal(&Meal::new(user_id, MealType::Breakfast, date))
            .unwrap();

        let attached = store.add_food_to_meal(meal_id, &food, 2.0).unwrap();
        store.remove_food_from_meal(attached.id).unwrap();

        let meal = store.get_meal(meal_id).unwrap().unwrap();
        assert_eq!(meal.total_calories, 0.0);
        assert!(store.list_meal_foods(meal_id).unwrap().is_empty());

        assert!(matches!(
            store.remove_food_from_meal(attached.id),
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_custom_and_category_listing() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut custom = oats();
        custom.name = "My Granola".to_string();
        custom.category = Some("grains".to_string());
        custom.is_custom = true;
        custom.user_id = Some(user_id);
        store.insert_food(&custom).unwrap();

        let mut catalog = oats();
        catalog.category = Some("grains".to_string());
        store.insert_food(&catalog).unwrap();

        let custom_foods = store.list_custom_foods(user_id).unwrap();
        assert_eq!(custom_foods.len(), 1);
        assert_eq!(custom_foods[0].name, "My Granola");

        let grains = store.list_foods_by_category("grains").unwrap();
        assert_eq!(grains.len(), 2);
    }

    #[test]
    fn test_summaries_between() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut food = oats();
        food.id = store.insert_food(&food).unwrap();

        for day in 1..=3 {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            let meal_id = store
                .insert_meal(&Meal::new(user_id, MealType::Lunch, date))
                .unwrap();
            store.add_food_to_meal(meal_id, &food, day as f64).unwrap();
            store.refresh_daily_summary(user_id, date).unwrap();
        }

        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let summaries = store.summaries_between(user_id, from, to).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].total_calories, 150.0);
        assert_eq!(summaries[1].total_calories, 300.0);

        // (150 + 300) / 2
        let avg = store.average_calories_between(user_id, from, to).unwrap();
        assert_eq!(avg, Some(225.0));

        let empty_from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let empty_to = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(
            store
                .average_calories_between(user_id, empty_from, empty_to)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_delete_meal_cascades() {
        let (db, user_id) = setup();
        let store = NutritionStore::new(db.connection());

        let mut food = oats();
        food.id = store.insert_food(&food).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let meal_id = store
            .insert_meal(&Meal::new(user_id, MealType::Dinner, date))
            .unwrap();
        store.add_food_to_meal(meal_id, &food, 1.0).unwrap();

        store.delete_meal(meal_id).unwrap();
        assert!(store.get_meal(meal_id).unwrap().is_none());
        assert!(store.list_meal_foods(meal_id).unwrap().is_empty());
    }
}
