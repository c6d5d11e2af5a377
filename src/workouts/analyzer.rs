//! Strength analysis: 1RM estimation, volume, overload and deload detection.
//!
//! 1RM formulas follow Epley (1985) and Brzycki (1993); the averaged estimate
//! is more accurate than either alone in the 1-10 rep range.

use super::types::{SetMetrics, StrengthLevel};

const EPLEY_CONSTANT: f64 = 30.0;
const BRZYCKI_NUMERATOR: f64 = 36.0;
const BRZYCKI_DENOMINATOR_BASE: f64 = 37.0;

/// Volume must increase by at least this fraction to count as overload.
const PROGRESSIVE_OVERLOAD_THRESHOLD: f64 = 0.025;
/// Session-over-session volume drop that counts as a decline (%).
const DELOAD_DECLINE_PERCENT: f64 = -10.0;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Estimated 1RM via Epley: weight * (1 + reps/30). Rounded to 1 decimal.
pub fn one_rm_epley(weight_kg: f64, reps: u32) -> f64 {
    if reps == 0 || weight_kg <= 0.0 {
        return 0.0;
    }
    if reps == 1 {
        return weight_kg;
    }
    round1(weight_kg * (1.0 + f64::from(reps) / EPLEY_CONSTANT))
}

/// Estimated 1RM via Brzycki: weight * (36 / (37 - reps)).
///
/// Returns 0.0 for 37+ reps where the formula breaks down.
pub fn one_rm_brzycki(weight_kg: f64, reps: u32) -> f64 {
    if reps == 0 || weight_kg <= 0.0 {
        return 0.0;
    }
    if reps == 1 {
        return weight_kg;
    }
    if reps >= 37 {
        return 0.0;
    }
    round1(weight_kg * (BRZYCKI_NUMERATOR / (BRZYCKI_DENOMINATOR_BASE - f64::from(reps))))
}

/// Average of the Epley and Brzycki estimates, falling back to Epley when
/// Brzycki is out of range.
pub fn one_rm(weight_kg: f64, reps: u32) -> f64 {
    let epley = one_rm_epley(weight_kg, reps);
    let brzycki = one_rm_brzycki(weight_kg, reps);

    if brzycki == 0.0 {
        return epley;
    }
    round1((epley + brzycki) / 2.0)
}

/// Training weight for a target rep count, inverting the Epley formula.
pub fn training_weight(one_rm: f64, target_reps: u32) -> f64 {
    if target_reps == 0 || one_rm <= 0.0 {
        return 0.0;
    }
    if target_reps == 1 {
        return one_rm;
    }
    round1(one_rm / (1.0 + f64::from(target_reps) / EPLEY_CONSTANT))
}

/// Training weight as a percentage of 1RM (0-100, 1 decimal).
pub fn percent_of_one_rm(weight_kg: f64, one_rm: f64) -> f64 {
    if one_rm <= 0.0 {
        return 0.0;
    }
    round1(weight_kg / one_rm * 100.0)
}

/// Volume of a single set: weight x reps.
pub fn set_volume(weight_kg: f64, reps: u32) -> f64 {
    weight_kg * f64::from(reps)
}

/// Total volume over (weight, reps) pairs.
pub fn total_volume(sets: &[(f64, u32)]) -> f64 {
    sets.iter().map(|&(w, r)| set_volume(w, r)).sum()
}

/// Sum of per-exercise volumes for a session, rounded to a whole number.
pub fn session_volume(exercise_volumes: &[f64]) -> f64 {
    exercise_volumes.iter().sum::<f64>().round()
}

/// Whether volume grew enough over the previous workout to count as
/// progressive overload (>= 2.5%).
pub fn is_progressive_overload(previous_volume: f64, current_volume: f64) -> bool {
    if previous_volume <= 0.0 {
        return false;
    }
    (current_volume - previous_volume) / previous_volume >= PROGRESSIVE_OVERLOAD_THRESHOLD
}

/// Percent volume change against the previous workout (1 decimal,
/// negative = decline). 0.0 when there is no previous volume.
pub fn volume_improvement(previous_volume: f64, current_volume: f64) -> f64 {
    if previous_volume <= 0.0 {
        return 0.0;
    }
    round1((current_volume - previous_volume) / previous_volume * 100.0)
}

/// Classify strength from the 1RM to body-weight ratio, using conservative
/// squat standards as the baseline.
pub fn strength_level(one_rm: f64, body_weight_kg: f64) -> StrengthLevel {
    if body_weight_kg <= 0.0 || one_rm <= 0.0 {
        return StrengthLevel::Unknown;
    }

    let ratio = one_rm / body_weight_kg;
    if ratio < 1.0 {
        StrengthLevel::Beginner
    } else if ratio < 1.5 {
        StrengthLevel::Intermediate
    } else if ratio < 2.0 {
        StrengthLevel::Advanced
    } else {
        StrengthLevel::Elite
    }
}

/// Average training intensity as a percentage of 1RM across sets.
///
/// Takes parallel slices of set weights and matching 1RMs; 0.0 when empty
/// or mismatched.
pub fn average_intensity(weights: &[f64], one_rms: &[f64]) -> f64 {
    if weights.is_empty() || weights.len() != one_rms.len() {
        return 0.0;
    }

    let total: f64 = weights
        .iter()
        .zip(one_rms)
        .map(|(&w, &rm)| percent_of_one_rm(w, rm))
        .sum();
    round1(total / weights.len() as f64)
}

/// Recommend a deload when volume dropped more than 10% session-over-session
/// at least twice across the given recent volumes (oldest first).
pub fn should_deload(recent_volumes: &[f64]) -> bool {
    if recent_volumes.len() < 3 {
        return false;
    }

    let declines = recent_volumes
        .windows(2)
        .filter(|pair| {
            let change = (pair[1] - pair[0]) / pair[0] * 100.0;
            change < DELOAD_DECLINE_PERCENT
        })
        .count();

    declines >= 2
}

/// Recommended rest in seconds for a given training intensity.
pub fn recommended_rest_secs(percent_of_one_rm: f64) -> u32 {
    if percent_of_one_rm >= 90.0 {
        300
    } else if percent_of_one_rm >= 80.0 {
        180
    } else if percent_of_one_rm >= 70.0 {
        120
    } else {
        60
    }
}

/// Analyze a single set against the lifter's body weight and the volume of
/// the previous comparable workout.
pub fn analyze_set(
    weight_kg: f64,
    reps: u32,
    body_weight_kg: f64,
    previous_volume: f64,
) -> SetMetrics {
    let estimated = one_rm(weight_kg, reps);
    let volume = set_volume(weight_kg, reps);

    SetMetrics {
        weight_kg,
        reps,
        estimated_one_rm: estimated,
        volume,
        percent_of_one_rm: percent_of_one_rm(weight_kg, estimated),
        strength_level: strength_level(estimated, body_weight_kg),
        progressive_overload: is_progressive_overload(previous_volume, volume),
        volume_improvement: volume_improvement(previous_volume, volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epley_single_rep_is_identity() {
        assert_eq!(one_rm_epley(100.0, 1), 100.0);
    }

    #[test]
    fn test_epley_known_values() {
        // 100 * (1 + 5/30) = 116.666 -> 116.7
        assert_eq!(one_rm_epley(100.0, 5), 116.7);
        // 80 * (1 + 10/30) = 106.666 -> 106.7
        assert_eq!(one_rm_epley(80.0, 10), 106.7);
    }

    #[test]
    fn test_brzycki_known_values() {
        // 100 * (36 / 32) = 112.5
        assert_eq!(one_rm_brzycki(100.0, 5), 112.5);
        assert_eq!(one_rm_brzycki(100.0, 1), 100.0);
    }

    #[test]
    fn test_brzycki_out_of_range() {
        assert_eq!(one_rm_brzycki(100.0, 37), 0.0);
        assert_eq!(one_rm_brzycki(100.0, 50), 0.0);
    }

    #[test]
    fn test_one_rm_averages_formulas() {
        // (116.7 + 112.5) / 2 = 114.6
        assert_eq!(one_rm(100.0, 5), 114.6);
        // Brzycki invalid at 40 reps, falls back to Epley
        assert_eq!(one_rm(50.0, 40), one_rm_epley(50.0, 40));
    }

    #[test]
    fn test_invalid_inputs_yield_zero() {
        assert_eq!(one_rm_epley(0.0, 5), 0.0);
        assert_eq!(one_rm_epley(100.0, 0), 0.0);
        assert_eq!(one_rm_brzycki(-10.0, 5), 0.0);
        assert_eq!(training_weight(0.0, 5), 0.0);
        assert_eq!(percent_of_one_rm(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_training_weight_inverts_epley() {
        // 120 / (1 + 5/30) = 102.857 -> 102.9
        assert_eq!(training_weight(120.0, 5), 102.9);
        assert_eq!(training_weight(120.0, 1), 120.0);
    }

    #[test]
    fn test_percent_of_one_rm() {
        assert_eq!(percent_of_one_rm(80.0, 100.0), 80.0);
        assert_eq!(percent_of_one_rm(85.5, 100.0), 85.5);
    }

    #[test]
    fn test_volume() {
        assert_eq!(set_volume(100.0, 5), 500.0);
        assert_eq!(total_volume(&[(100.0, 5), (90.0, 8)]), 1220.0);
        assert_eq!(total_volume(&[]), 0.0);
        assert_eq!(session_volume(&[500.25, 720.5]), 1221.0);
    }

    #[test]
    fn test_progressive_overload_threshold() {
        assert!(is_progressive_overload(1000.0, 1025.0)); // exactly 2.5%
        assert!(is_progressive_overload(1000.0, 1100.0));
        assert!(!is_progressive_overload(1000.0, 1020.0));
        assert!(!is_progressive_overload(0.0, 1000.0)); // no baseline
    }

    #[test]
    fn test_volume_improvement() {
        assert_eq!(volume_improvement(1000.0, 1100.0), 10.0);
        assert_eq!(volume_improvement(1000.0, 900.0), -10.0);
        assert_eq!(volume_improvement(0.0, 1000.0), 0.0);
    }

    #[test]
    fn test_strength_levels() {
        assert_eq!(strength_level(70.0, 80.0), StrengthLevel::Beginner);
        assert_eq!(strength_level(100.0, 80.0), StrengthLevel::Intermediate);
        assert_eq!(strength_level(130.0, 80.0), StrengthLevel::Advanced);
        assert_eq!(strength_level(160.0, 80.0), StrengthLevel::Elite);
        assert_eq!(strength_level(100.0, 0.0), StrengthLevel::Unknown);
    }

    #[test]
    fn test_average_intensity() {
        let weights = [80.0, 90.0];
        let one_rms = [100.0, 100.0];
        assert_eq!(average_intensity(&weights, &one_rms), 85.0);
        assert_eq!(average_intensity(&[], &[]), 0.0);
        assert_eq!(average_intensity(&[80.0], &[]), 0.0);
    }

    #[test]
    fn test_should_deload() {
        // Two drops of more than 10%
        assert!(should_deload(&[1000.0, 850.0, 700.0]));
        // Only one decline
        assert!(!should_deload(&[1000.0, 850.0, 900.0]));
        // Steady progress
        assert!(!should_deload(&[1000.0, 1050.0, 1100.0]));
        // Not enough history
        assert!(!should_deload(&[1000.0, 800.0]));
    }

    #[test]
    fn test_recommended_rest() {
        assert_eq!(recommended_rest_secs(95.0), 300);
        assert_eq!(recommended_rest_secs(85.0), 180);
        assert_eq!(recommended_rest_secs(75.0), 120);
        assert_eq!(recommended_rest_secs(60.0), 60);
    }

    #[test]
    fn test_analyze_set() {
        let metrics = analyze_set(100.0, 5, 80.0, 450.0);
        assert_eq!(metrics.volume, 500.0);
        assert_eq!(metrics.estimated_one_rm, 114.6);
        assert!(metrics.progressive_overload);
        assert!(metrics.volume_improvement > 10.0);
        assert_eq!(metrics.strength_level, StrengthLevel::Intermediate);
        assert!(metrics.progress_message().contains("Progressive overload"));
    }
}
