//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod nutrition_store;
pub mod schema;
pub mod workout_store;

pub use config::{AppConfig, ConfigError, DisplaySettings, TrackingSettings};
pub use database::{Database, DatabaseError};
pub use nutrition_store::NutritionStore;
pub use workout_store::WorkoutStore;
