//! Metabolic rate and macronutrient calculations.
//!
//! BMR uses the Mifflin-St Jeor equation (Mifflin et al. 1990); TDEE
//! multipliers follow the Harris-Benedict refinements (Roza & Shizgal 1984).

use super::types::{ActivityLevel, BmiCategory, GoalType, MacroSplit, NutritionProfile, Sex};

// Mifflin-St Jeor: BMR = 10*w + 6.25*h - 5*age + s
const MIFFLIN_WEIGHT_FACTOR: f64 = 10.0;
const MIFFLIN_HEIGHT_FACTOR: f64 = 6.25;
const MIFFLIN_AGE_FACTOR: f64 = 5.0;
const MIFFLIN_MALE_CONSTANT: f64 = 5.0;
const MIFFLIN_FEMALE_CONSTANT: f64 = -161.0;

const CALORIES_PER_GRAM_PROTEIN: f64 = 4.0;
const CALORIES_PER_GRAM_CARBS: f64 = 4.0;
const CALORIES_PER_GRAM_FATS: f64 = 9.0;

// Daily intake safety floors, below which medical supervision is advised.
const MIN_CALORIES_MALE: f64 = 1500.0;
const MIN_CALORIES_FEMALE: f64 = 1200.0;

// WHO BMI thresholds.
const BMI_UNDERWEIGHT: f64 = 18.5;
const BMI_NORMAL: f64 = 24.9;
const BMI_OVERWEIGHT: f64 = 29.9;

impl ActivityLevel {
    /// TDEE multiplier for this activity level.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl GoalType {
    /// Calorie-split percentages (protein, carbs, fats) for this goal.
    fn macro_percentages(self) -> (f64, f64, f64) {
        match self {
            GoalType::Maintenance => (0.30, 0.40, 0.30),
            GoalType::Cutting => (0.40, 0.30, 0.30),
            GoalType::Bulking => (0.30, 0.50, 0.20),
        }
    }
}

impl BmiCategory {
    /// Classify a BMI value.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < BMI_UNDERWEIGHT {
            BmiCategory::Underweight
        } else if bmi <= BMI_NORMAL {
            BmiCategory::Normal
        } else if bmi <= BMI_OVERWEIGHT {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Basal metabolic rate in kcal/day, rounded to a whole number.
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let base = MIFFLIN_WEIGHT_FACTOR * weight_kg + MIFFLIN_HEIGHT_FACTOR * height_cm
        - MIFFLIN_AGE_FACTOR * f64::from(age);

    let adjusted = match sex {
        Sex::Male => base + MIFFLIN_MALE_CONSTANT,
        Sex::Female => base + MIFFLIN_FEMALE_CONSTANT,
    };

    adjusted.round()
}

/// Total daily energy expenditure: BMR scaled by the activity multiplier.
pub fn tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    (bmr * activity.multiplier()).round()
}

/// Daily calorie target for the goal: -500 cutting, +300 bulking.
pub fn calorie_target(tdee: f64, goal: GoalType) -> f64 {
    let target = match goal {
        GoalType::Cutting => tdee - 500.0,
        GoalType::Bulking => tdee + 300.0,
        GoalType::Maintenance => tdee,
    };
    target.round()
}

/// Enforce the per-sex minimum safe calorie intake.
pub fn clamp_calorie_target(target: f64, sex: Sex) -> f64 {
    let floor = match sex {
        Sex::Male => MIN_CALORIES_MALE,
        Sex::Female => MIN_CALORIES_FEMALE,
    };
    target.max(floor)
}

/// Macronutrient distribution in grams for a calorie target.
pub fn macro_split(total_calories: f64, goal: GoalType) -> MacroSplit {
    let (protein_pct, carbs_pct, fats_pct) = goal.macro_percentages();

    MacroSplit {
        protein_g: (total_calories * protein_pct / CALORIES_PER_GRAM_PROTEIN).round(),
        carbs_g: (total_calories * carbs_pct / CALORIES_PER_GRAM_CARBS).round(),
        fats_g: (total_calories * fats_pct / CALORIES_PER_GRAM_FATS).round(),
    }
}

/// Daily protein requirement in grams based on body weight and goal.
pub fn protein_requirement(weight_kg: f64, goal: GoalType) -> f64 {
    let multiplier = match goal {
        // Higher protein to preserve muscle during a deficit
        GoalType::Cutting => 2.2,
        GoalType::Bulking => 1.8,
        GoalType::Maintenance => 1.6,
    };
    (weight_kg * multiplier).round()
}

/// Body mass index, rounded to 1 decimal.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);
    (value * 10.0).round() / 10.0
}

/// Recommended water intake in liters/day: 33 ml/kg, +15% when active.
pub fn water_intake(weight_kg: f64, activity: ActivityLevel) -> f64 {
    let mut liters = weight_kg * 0.033;
    if matches!(activity, ActivityLevel::Active | ActivityLevel::VeryActive) {
        liters *= 1.15;
    }
    (liters * 10.0).round() / 10.0
}

/// Assemble the complete nutrition profile for a user's body stats.
pub fn profile(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
    activity: ActivityLevel,
    goal: GoalType,
) -> NutritionProfile {
    let bmr_value = bmr(weight_kg, height_cm, age, sex);
    let tdee_value = tdee(bmr_value, activity);
    let target = clamp_calorie_target(calorie_target(tdee_value, goal), sex);

    let bmi_value = bmi(weight_kg, height_cm);

    NutritionProfile {
        bmr: bmr_value,
        tdee: tdee_value,
        calorie_target: target,
        macros: macro_split(target, goal),
        bmi: bmi_value,
        bmi_category: BmiCategory::from_bmi(bmi_value),
        water_liters: water_intake(weight_kg, activity),
        goal,
        activity_level: activity,
    }
}

/// Infer the dietary goal from current weight versus goal weight.
pub fn goal_for_target(current_kg: f64, goal_kg: f64) -> GoalType {
    if goal_kg < current_kg {
        GoalType::Cutting
    } else if goal_kg > current_kg {
        GoalType::Bulking
    } else {
        GoalType::Maintenance
    }
}
