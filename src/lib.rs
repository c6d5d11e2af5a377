//! WeightTrack - Body Weight and Fitness Tracking
//!
//! A local-first weight tracking engine with user accounts, trend analytics,
//! nutrition planning, and strength workout logging over SQLite.

pub mod account;
pub mod nutrition;
pub mod storage;
pub mod tracker;
pub mod tracking;
pub mod units;
pub mod workouts;

// Re-export commonly used types
pub use account::User;
pub use storage::config::AppConfig;
pub use storage::database::Database;
pub use tracker::{Tracker, TrackerError};
pub use tracking::types::{WeightEntry, WeightTrendReport};
pub use units::Unit;
