//! Weight entry and trend analysis types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logged body-weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Database rowid (0 before insertion)
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// When the measurement was taken
    pub recorded_at: DateTime<Utc>,
}

impl WeightEntry {
    /// Create a new entry that has not been persisted yet.
    pub fn new(user_id: i64, weight_kg: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            user_id,
            weight_kg,
            recorded_at,
        }
    }
}

/// Direction of the overall weight trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Losing,
    Gaining,
    Maintaining,
    /// Fewer than the minimum number of data points for a meaningful trend.
    InsufficientData,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Losing => write!(f, "losing"),
            TrendDirection::Gaining => write!(f, "gaining"),
            TrendDirection::Maintaining => write!(f, "maintaining"),
            TrendDirection::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

/// Full statistical report over a user's weight history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightTrendReport {
    /// Latest logged weight in kg
    pub current_weight: f64,
    /// Trailing 7-day moving average (current weight when under 7 entries)
    pub seven_day_average: f64,
    /// Trailing 30-day moving average (current weight when under 30 entries)
    pub thirty_day_average: f64,
    /// Regression slope in kg per week (negative = losing)
    pub weekly_change_rate: f64,
    /// Overall direction
    pub direction: TrendDirection,
    /// Linear projection 30 days out
    pub predicted_weight_30d: f64,
    /// Estimated days until the goal weight, None if the trend moves away
    pub days_to_goal: Option<u32>,
    /// Population standard deviation of logged weights
    pub standard_deviation: f64,
}

impl WeightTrendReport {
    /// One-line description of the trend.
    pub fn trend_description(&self) -> String {
        match self.direction {
            TrendDirection::Losing => {
                format!("Losing {:.1} kg/week", self.weekly_change_rate.abs())
            }
            TrendDirection::Gaining => {
                format!("Gaining {:.1} kg/week", self.weekly_change_rate)
            }
            TrendDirection::Maintaining => "Maintaining weight".to_string(),
            TrendDirection::InsufficientData => "Insufficient data".to_string(),
        }
    }

    /// Goal progress message.
    pub fn goal_progress_message(&self) -> String {
        match self.days_to_goal {
            None => "Current trend is not moving toward goal".to_string(),
            Some(0) => "Goal weight reached!".to_string(),
            Some(days) => {
                format!("Estimated {} days ({} weeks) to goal", days, days / 7)
            }
        }
    }
}
