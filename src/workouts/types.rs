//! Workout domain types: exercises, sessions, sets, records, templates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An exercise, either from the built-in catalog or user-created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    /// e.g. "chest", "back", "legs", "shoulders", "arms", "core", "cardio"
    pub category: String,
    /// e.g. "barbell", "dumbbell", "machine", "bodyweight", "cable"
    pub equipment: Option<String>,
    pub primary_muscle: Option<String>,
    pub secondary_muscle: Option<String>,
    pub description: Option<String>,
    pub is_custom: bool,
    /// Owning user for custom exercises, None for catalog exercises
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            category: category.into(),
            equipment: None,
            primary_muscle: None,
            secondary_muscle: None,
            description: None,
            is_custom: false,
            user_id: None,
            created_at: Utc::now(),
        }
    }
}

/// One workout on a specific date. Volume and set totals are maintained
/// from the associated sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    /// Sum of weight x reps across all sets, in kg
    pub total_volume: f64,
    pub total_sets: u32,
}

impl WorkoutSession {
    pub fn new(user_id: i64, date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            date,
            started_at: Utc::now(),
            duration_minutes: 0,
            notes: None,
            total_volume: 0.0,
            total_sets: 0,
        }
    }

    /// Fold a set's volume into the session totals.
    pub fn add_set_volume(&mut self, weight_kg: f64, reps: u32) {
        self.total_volume += weight_kg * f64::from(reps);
        self.total_sets += 1;
    }
}

/// A single set within a session. Volume and estimated 1RM are computed
/// on insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub session_id: i64,
    pub exercise_id: i64,
    /// 1-based position within the exercise
    pub set_number: u32,
    pub weight_kg: f64,
    pub reps: u32,
    /// Rate of perceived exertion, 1-10
    pub rpe: Option<u8>,
    pub notes: Option<String>,
    pub estimated_one_rm: Option<f64>,
    pub volume: f64,
    pub recorded_at: DateTime<Utc>,
}

impl WorkoutSet {
    pub fn new(
        session_id: i64,
        exercise_id: i64,
        set_number: u32,
        weight_kg: f64,
        reps: u32,
    ) -> Self {
        Self {
            id: 0,
            session_id,
            exercise_id,
            set_number,
            weight_kg,
            reps,
            rpe: None,
            notes: None,
            estimated_one_rm: None,
            volume: weight_kg * f64::from(reps),
            recorded_at: Utc::now(),
        }
    }
}

/// Category of personal record tracked per exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    MaxWeight,
    MaxVolume,
    MaxReps,
    EstimatedOneRm,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::MaxWeight => "max_weight",
            RecordType::MaxVolume => "max_volume",
            RecordType::MaxReps => "max_reps",
            RecordType::EstimatedOneRm => "estimated_1rm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "max_weight" => Some(RecordType::MaxWeight),
            "max_volume" => Some(RecordType::MaxVolume),
            "max_reps" => Some(RecordType::MaxReps),
            "estimated_1rm" => Some(RecordType::EstimatedOneRm),
            _ => None,
        }
    }
}

/// A personal record for one (user, exercise, record type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub record_type: RecordType,
    pub value: f64,
    /// For max-weight records, the rep count at that weight
    pub reps: Option<u32>,
    pub achieved_on: NaiveDate,
}

/// A reusable workout plan referencing an ordered list of exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub exercise_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

/// Strength classification relative to body weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Beginner,
    Intermediate,
    Advanced,
    Elite,
    /// Body weight or 1RM missing/invalid
    Unknown,
}

impl std::fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrengthLevel::Beginner => write!(f, "Beginner"),
            StrengthLevel::Intermediate => write!(f, "Intermediate"),
            StrengthLevel::Advanced => write!(f, "Advanced"),
            StrengthLevel::Elite => write!(f, "Elite"),
            StrengthLevel::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Analysis result for a single set in the context of recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMetrics {
    pub weight_kg: f64,
    pub reps: u32,
    pub estimated_one_rm: f64,
    pub volume: f64,
    pub percent_of_one_rm: f64,
    pub strength_level: StrengthLevel,
    pub progressive_overload: bool,
    /// Percent volume change versus the previous comparable workout
    pub volume_improvement: f64,
}

impl SetMetrics {
    /// Progress indicator message for display.
    pub fn progress_message(&self) -> String {
        if self.progressive_overload {
            format!(
                "Progressive overload achieved! +{:.1}% volume",
                self.volume_improvement
            )
        } else if self.volume_improvement > 0.0 {
            format!("Slight improvement: +{:.1}% volume", self.volume_improvement)
        } else if self.volume_improvement < 0.0 {
            format!("Volume decreased: {:.1}%", self.volume_improvement)
        } else {
            "First workout - establish baseline".to_string()
        }
    }
}
