//! Body-weight tracking: entries, trend statistics, and sample data.

pub mod sample;
pub mod stats;
pub mod types;

pub use types::{TrendDirection, WeightEntry, WeightTrendReport};
