//! Nutrition module: metabolic calculations, foods, meals, and goals.

pub mod calculator;
pub mod types;

pub use types::{
    ActivityLevel, BmiCategory, DailyNutritionSummary, Food, GoalType, MacroSplit, Meal, MealFood,
    MealType, NutritionGoal, NutritionProfile, Sex,
};
