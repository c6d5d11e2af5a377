//! Workout module for strength sessions, sets, and personal records.

pub mod analyzer;
pub mod types;

pub use types::{
    Exercise, PersonalRecord, RecordType, SetMetrics, StrengthLevel, WorkoutSession, WorkoutSet,
    WorkoutTemplate,
};
