//! Synthetic weight data for demos and statistics tests.
//!
//! Generates progressions with bounded day-to-day fluctuation. The jitter is
//! deterministic (hash-based), so generated series are reproducible.

use chrono::{Duration, Utc};

use super::types::WeightEntry;

/// Deterministic jitter in [-0.5, 0.5) derived from a seed and day index.
fn jitter(seed: u64, day: u64) -> f64 {
    // splitmix64 step, plenty for demo noise
    let mut z = seed.wrapping_add(day.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z as f64 / u64::MAX as f64) - 0.5
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Generate `days` daily entries trending from `start_kg` toward `target_kg`.
///
/// Daily fluctuation is bounded to roughly ±0.3 kg and the series is clamped
/// between the start and target weights. Works for loss and gain alike.
pub fn generate_trend(user_id: i64, start_kg: f64, target_kg: f64, days: u32) -> Vec<WeightEntry> {
    if days == 0 {
        return Vec::new();
    }

    let avg_daily_change = (target_kg - start_kg) / f64::from(days);
    let first_day = Utc::now() - Duration::days(i64::from(days));
    let (lower, upper) = if start_kg <= target_kg {
        (start_kg, target_kg)
    } else {
        (target_kg, start_kg)
    };

    let mut entries = Vec::with_capacity(days as usize);
    let mut weight = start_kg;

    for day in 0..days {
        let fluctuation = jitter(user_id as u64, u64::from(day)) * 0.6;
        weight = (weight + avg_daily_change + fluctuation).clamp(lower, upper);

        entries.push(WeightEntry::new(
            user_id,
            round1(weight),
            first_day + Duration::days(i64::from(day)),
        ));
    }

    entries
}

/// Generate `days` entries fluctuating around a stable `weight_kg`.
pub fn generate_maintenance(user_id: i64, weight_kg: f64, days: u32) -> Vec<WeightEntry> {
    let first_day = Utc::now() - Duration::days(i64::from(days));

    (0..days)
        .map(|day| {
            let fluctuation = jitter(user_id as u64, u64::from(day));
            WeightEntry::new(
                user_id,
                round1(weight_kg + fluctuation),
                first_day + Duration::days(i64::from(day)),
            )
        })
        .collect()
}

/// Thirty days of healthy weight loss (85 kg down to 83 kg, ~0.5 kg/week).
pub fn generate_demo_data(user_id: i64) -> Vec<WeightEntry> {
    generate_trend(user_id, 85.0, 83.0, 30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::stats;
    use crate::tracking::types::TrendDirection;

    #[test]
    fn test_trend_stays_in_bounds() {
        let entries = generate_trend(1, 85.0, 83.0, 30);
        assert_eq!(entries.len(), 30);
        for e in &entries {
            assert!(e.weight_kg >= 83.0 && e.weight_kg <= 85.0);
        }
    }

    #[test]
    fn test_trend_is_sorted_by_date() {
        let entries = generate_trend(1, 85.0, 83.0, 30);
        for pair in entries.windows(2) {
            assert!(pair[0].recorded_at < pair[1].recorded_at);
        }
    }

    #[test]
    fn test_demo_data_detected_as_losing() {
        let entries = generate_demo_data(7);
        assert_eq!(stats::detect_trend(&entries), TrendDirection::Losing);
    }

    #[test]
    fn test_gain_trend() {
        let entries = generate_trend(2, 70.0, 74.0, 60);
        let rate = stats::change_rate_per_week(&entries);
        assert!(rate > 0.0);
    }

    #[test]
    fn test_maintenance_is_flat() {
        let entries = generate_maintenance(3, 75.0, 30);
        assert_eq!(entries.len(), 30);
        let direction = stats::detect_trend(&entries);
        assert_eq!(direction, TrendDirection::Maintaining);
    }

    #[test]
    fn test_deterministic() {
        let a = generate_trend(5, 85.0, 83.0, 30);
        let b = generate_trend(5, 85.0, 83.0, 30);
        let weights_a: Vec<f64> = a.iter().map(|e| e.weight_kg).collect();
        let weights_b: Vec<f64> = b.iter().map(|e| e.weight_kg).collect();
        assert_eq!(weights_a, weights_b);
    }

    #[test]
    fn test_zero_days() {
        assert!(generate_trend(1, 85.0, 83.0, 0).is_empty());
    }
}
