//! Nutrition domain types: foods, meals, summaries, goals, and the
//! calculated nutrition profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Biological sex for metabolic rate formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Weekly activity level for energy expenditure estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// 1-3 days/week
    Light,
    /// 3-5 days/week
    Moderate,
    /// 6-7 days/week
    Active,
    /// Athlete or physical job
    VeryActive,
}

/// Dietary goal driving calorie targets and macro splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Maintain current weight
    Maintenance,
    /// Lose fat (calorie deficit, high protein)
    Cutting,
    /// Gain muscle (calorie surplus, high carbs)
    Bulking,
}

/// BMI classification per WHO thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "Underweight"),
            BmiCategory::Normal => write!(f, "Normal"),
            BmiCategory::Overweight => write!(f, "Overweight"),
            BmiCategory::Obese => write!(f, "Obese"),
        }
    }
}

/// Daily macronutrient targets in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

/// Complete calculated nutrition profile for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionProfile {
    /// Basal metabolic rate in kcal/day
    pub bmr: f64,
    /// Total daily energy expenditure in kcal/day
    pub tdee: f64,
    /// Daily calorie target after goal adjustment and safety clamp
    pub calorie_target: f64,
    /// Macro distribution for the calorie target
    pub macros: MacroSplit,
    /// Body mass index
    pub bmi: f64,
    /// BMI classification
    pub bmi_category: BmiCategory,
    /// Recommended water intake in liters/day
    pub water_liters: f64,
    pub goal: GoalType,
    pub activity_level: ActivityLevel,
}

impl NutritionProfile {
    /// Calorie surplus (positive) or deficit (negative) relative to TDEE.
    pub fn calorie_balance(&self) -> f64 {
        self.calorie_target - self.tdee
    }

    /// Multi-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "BMR: {:.0} kcal | TDEE: {:.0} kcal | Target: {:.0} kcal\n\
             Macros: P={:.0}g C={:.0}g F={:.0}g\n\
             BMI: {:.1} ({}) | Water: {:.1}L/day",
            self.bmr,
            self.tdee,
            self.calorie_target,
            self.macros.protein_g,
            self.macros.carbs_g,
            self.macros.fats_g,
            self.bmi,
            self.bmi_category,
            self.water_liters,
        )
    }
}

/// A food item, either from the built-in catalog or user-created.
/// Nutrient values are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    /// Serving size in grams
    pub serving_size_g: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub category: Option<String>,
    /// True for user-created foods
    pub is_custom: bool,
    /// Owning user for custom foods, None for catalog foods
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Food {
    /// Create a catalog food with the given name and per-serving nutrients.
    pub fn new(name: impl Into<String>, serving_size_g: f64, calories: f64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            brand: None,
            serving_size_g,
            calories,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            fiber: 0.0,
            sugar: 0.0,
            category: None,
            is_custom: false,
            user_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Meal slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged meal. Totals are recomputed from the attached foods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    pub meal_type: MealType,
    /// Calendar day the meal belongs to
    pub date: NaiveDate,
    pub logged_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
}

impl Meal {
    pub fn new(user_id: i64, meal_type: MealType, date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            meal_type,
            date,
            logged_at: Utc::now(),
            notes: None,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fats: 0.0,
        }
    }
}

/// Join row attaching a food to a meal with the consumed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealFood {
    pub id: i64,
    pub meal_id: i64,
    pub food_id: i64,
    /// Number of servings consumed
    pub servings: f64,
    /// Total grams consumed
    pub grams_consumed: f64,
}

/// Aggregated nutrition for one user-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutritionSummary {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub meals_logged: u32,
    pub last_updated: DateTime<Utc>,
}

/// Persisted nutrition targets, one row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoal {
    pub id: i64,
    pub user_id: i64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal: GoalType,
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_target: f64,
    pub protein_target: f64,
    pub carbs_target: f64,
    pub fats_target: f64,
    /// Liters per day
    pub water_target: f64,
    pub calculated_at: DateTime<Utc>,
}
