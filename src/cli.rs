//! Command-line interface for the tracker.

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use weighttrack::nutrition::types::{ActivityLevel, Sex};
use weighttrack::storage::config;
use weighttrack::tracker::Tracker;
use weighttrack::units::{self, Unit};

#[derive(Parser)]
#[command(name = "weighttrack", version, about = "Body weight and fitness tracking")]
pub struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Goal weight in your preferred unit
        #[arg(long)]
        goal_weight: f64,
        /// Preferred unit: kg or lbs
        #[arg(long, default_value = "kg")]
        unit: String,
        #[arg(long)]
        phone: String,
    },
    /// Log a weight measurement
    Log {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        weight: f64,
        /// Unit of the given weight (defaults to the account preference)
        #[arg(long)]
        unit: Option<String>,
    },
    /// Show logged weight history
    History {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Show only the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the weight trend report
    Trend {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Calculate calorie and macro targets
    Nutrition {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Height in centimeters
        #[arg(long)]
        height: f64,
        #[arg(long)]
        age: u32,
        /// male or female
        #[arg(long)]
        sex: String,
        /// sedentary, light, moderate, active, or very_active
        #[arg(long, default_value = "moderate")]
        activity: String,
    },
    /// Record a workout set
    Workout {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Exercise name, e.g. "Barbell Squat"
        #[arg(long)]
        exercise: String,
        /// Weight lifted in kg
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: u32,
    },
    /// List the exercise catalog
    Exercises {
        /// Filter by category, e.g. legs, chest, back
        #[arg(long)]
        category: Option<String>,
    },
    /// Seed thirty days of demo weight data
    Demo {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn parse_unit(s: &str) -> Result<Unit> {
    Unit::parse(s).ok_or_else(|| anyhow!("unknown unit '{}', expected kg or lbs", s))
}

fn parse_sex(s: &str) -> Result<Sex> {
    match s.to_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        _ => Err(anyhow!("unknown sex '{}', expected male or female", s)),
    }
}

fn parse_activity(s: &str) -> Result<ActivityLevel> {
    match s.to_lowercase().as_str() {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "light" => Ok(ActivityLevel::Light),
        "moderate" => Ok(ActivityLevel::Moderate),
        "active" => Ok(ActivityLevel::Active),
        "very_active" | "very-active" => Ok(ActivityLevel::VeryActive),
        _ => Err(anyhow!("unknown activity level '{}'", s)),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(config::get_database_path);
    let tracker = Tracker::open(&db_path)?;

    match cli.command {
        Command::Register {
            username,
            password,
            goal_weight,
            unit,
            phone,
        } => {
            let unit = parse_unit(&unit)?;
            let user = tracker.register(&username, &password, goal_weight, unit, &phone)?;
            println!(
                "Registered {} (goal: {})",
                user.username,
                units::format_weight(
                    units::convert(user.goal_weight_kg, Unit::Kg, user.preferred_unit),
                    user.preferred_unit,
                    1
                )
            );
        }

        Command::Log {
            username,
            password,
            weight,
            unit,
        } => {
            let user = tracker.login(&username, &password)?;
            let unit = match unit {
                Some(s) => parse_unit(&s)?,
                None => user.preferred_unit,
            };
            let entry = tracker.log_weight(user.id, weight, unit)?;
            println!(
                "Logged {} at {}",
                units::format_weight(weight, unit, 1),
                entry.recorded_at.format("%Y-%m-%d %H:%M")
            );
        }

        Command::History {
            username,
            password,
            limit,
        } => {
            let user = tracker.login(&username, &password)?;
            let entries = tracker.weight_history(user.id)?;
            if entries.is_empty() {
                println!("No entries logged yet");
                return Ok(());
            }

            let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
            for entry in &entries[skip..] {
                let shown = units::convert(entry.weight_kg, Unit::Kg, user.preferred_unit);
                println!(
                    "{}  {}",
                    entry.recorded_at.format("%Y-%m-%d"),
                    units::format_weight(shown, user.preferred_unit, 1)
                );
            }
        }

        Command::Trend { username, password } => {
            let user = tracker.login(&username, &password)?;
            match tracker.trend_report(user.id)? {
                None => println!("No entries logged yet"),
                Some(report) => {
                    println!("Current: {:.1} kg", report.current_weight);
                    println!("7-day average: {:.1} kg", report.seven_day_average);
                    println!("30-day average: {:.1} kg", report.thirty_day_average);
                    println!("Trend: {}", report.trend_description());
                    if report.predicted_weight_30d > 0.0 {
                        println!("Projected in 30 days: {:.1} kg", report.predicted_weight_30d);
                    }
                    println!("{}", report.goal_progress_message());
                }
            }
        }

        Command::Nutrition {
            username,
            password,
            height,
            age,
            sex,
            activity,
        } => {
            let user = tracker.login(&username, &password)?;
            let sex = parse_sex(&sex)?;
            let activity = parse_activity(&activity)?;
            let profile = tracker.calculate_nutrition(user.id, height, age, sex, activity)?;
            println!("{}", profile.summary());
        }

        Command::Workout {
            username,
            password,
            exercise,
            weight,
            reps,
        } => {
            let user = tracker.login(&username, &password)?;
            let exercise = tracker
                .find_exercise(&exercise)?
                .ok_or_else(|| anyhow!("unknown exercise '{}'", exercise))?;

            let today = Utc::now().date_naive();
            // Reuse today's session if one exists
            let session = match tracker.sessions_for_date(user.id, today)?.pop() {
                Some(session) => session,
                None => tracker.start_session(user.id, today)?,
            };

            let set_number = tracker.session_sets(session.id)?.len() as u32 + 1;
            let (set, metrics) =
                tracker.record_set(user.id, session.id, exercise.id, set_number, weight, reps)?;

            println!(
                "{} set {}: {:.1} kg x {} (est. 1RM {:.1} kg)",
                exercise.name,
                set.set_number,
                set.weight_kg,
                set.reps,
                metrics.estimated_one_rm
            );
            println!("{}", metrics.progress_message());
            if tracker.deload_recommended(user.id)? {
                println!("Volume has been declining. Consider a deload week.");
            }
        }

        Command::Exercises { category } => {
            let exercises = tracker.list_exercises(category.as_deref())?;
            for exercise in exercises {
                println!(
                    "{:<20} {:<10} {}",
                    exercise.name,
                    exercise.category,
                    exercise.equipment.as_deref().unwrap_or("-")
                );
            }
        }

        Command::Demo { username, password } => {
            let user = tracker.login(&username, &password)?;
            let count = tracker.seed_demo_data(user.id)?;
            println!("Seeded {} demo entries", count);
        }
    }

    Ok(())
}
