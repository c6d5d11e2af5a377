//! Statistical analysis over weight entries.
//!
//! Moving averages, least-squares trend estimation, goal projection, and
//! consistency metrics. All functions expect entries sorted ascending by
//! `recorded_at`.

use super::types::{TrendDirection, WeightEntry, WeightTrendReport};

/// Minimum entries for a meaningful trend (one week of daily logging).
pub const MIN_ENTRIES_FOR_TREND: usize = 7;
/// Minimum entries for a forward prediction (two weeks).
pub const MIN_ENTRIES_FOR_PREDICTION: usize = 14;
/// Weekly change below this magnitude counts as maintaining (kg/week).
pub const TREND_THRESHOLD_KG_PER_WEEK: f64 = 0.2;
/// Short moving-average window in days.
pub const SHORT_WINDOW: usize = 7;
/// Long moving-average window in days.
pub const LONG_WINDOW: usize = 30;

const SECS_PER_DAY: f64 = 86_400.0;

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Simple moving average over a sliding window.
///
/// Returns one value per full window position, rounded to 1 decimal.
/// Empty when there are fewer entries than the window size.
pub fn moving_average(entries: &[WeightEntry], window: usize) -> Vec<f64> {
    if window == 0 || entries.len() < window {
        return Vec::new();
    }

    entries
        .windows(window)
        .map(|w| {
            let sum: f64 = w.iter().map(|e| e.weight_kg).sum();
            round_to(sum / window as f64, 1)
        })
        .collect()
}

/// Weight change rate in kg per day via least-squares regression.
///
/// slope = (n*Σxy - Σx*Σy) / (n*Σx² - (Σx)²) with x in days since the
/// first entry. Returns 0.0 for fewer than 2 entries or a degenerate
/// denominator. Rounded to 3 decimals.
pub fn change_rate_per_day(entries: &[WeightEntry]) -> f64 {
    if entries.len() < 2 {
        return 0.0;
    }

    let n = entries.len() as f64;
    let start = entries[0].recorded_at;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for entry in entries {
        let x = (entry.recorded_at - start).num_seconds() as f64 / SECS_PER_DAY;
        let y = entry.weight_kg;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < 1e-4 {
        return 0.0;
    }

    round_to((n * sum_xy - sum_x * sum_y) / denominator, 3)
}

/// Weight change rate in kg per week.
pub fn change_rate_per_week(entries: &[WeightEntry]) -> f64 {
    change_rate_per_day(entries) * 7.0
}

/// Detect the overall weight trend.
pub fn detect_trend(entries: &[WeightEntry]) -> TrendDirection {
    if entries.len() < MIN_ENTRIES_FOR_TREND {
        return TrendDirection::InsufficientData;
    }

    let rate = change_rate_per_week(entries);
    if rate < -TREND_THRESHOLD_KG_PER_WEEK {
        TrendDirection::Losing
    } else if rate > TREND_THRESHOLD_KG_PER_WEEK {
        TrendDirection::Gaining
    } else {
        TrendDirection::Maintaining
    }
}

/// Project weight `days_ahead` days forward along the regression line.
///
/// Requires at least [`MIN_ENTRIES_FOR_PREDICTION`] entries, else 0.0.
pub fn predict_weight(entries: &[WeightEntry], days_ahead: u32) -> f64 {
    if entries.len() < MIN_ENTRIES_FOR_PREDICTION {
        return 0.0;
    }

    let current = entries[entries.len() - 1].weight_kg;
    let daily_rate = change_rate_per_day(entries);
    round_to(current + daily_rate * f64::from(days_ahead), 1)
}

/// Days to reach the goal weight at the current rate.
///
/// None when there is no history, no measurable progress, or the trend is
/// moving away from the goal.
pub fn days_to_goal(entries: &[WeightEntry], goal_kg: f64) -> Option<u32> {
    let current = entries.last()?.weight_kg;
    let daily_rate = change_rate_per_day(entries);

    if daily_rate.abs() < 1e-3 {
        return None;
    }

    let difference = goal_kg - current;
    // Moving away from the goal
    if (difference > 0.0 && daily_rate < 0.0) || (difference < 0.0 && daily_rate > 0.0) {
        return None;
    }

    Some((difference / daily_rate).abs() as u32)
}

/// Population standard deviation of logged weights, rounded to 2 decimals.
pub fn standard_deviation(entries: &[WeightEntry]) -> f64 {
    if entries.len() < 2 {
        return 0.0;
    }

    let n = entries.len() as f64;
    let mean = entries.iter().map(|e| e.weight_kg).sum::<f64>() / n;
    let variance = entries
        .iter()
        .map(|e| {
            let diff = e.weight_kg - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    round_to(variance.sqrt(), 2)
}

/// Run the full trend analysis against a goal weight.
///
/// Returns None when there is no history at all. Moving-average tails fall
/// back to the current weight when the window is not yet filled.
pub fn analyze(entries: &[WeightEntry], goal_kg: f64) -> Option<WeightTrendReport> {
    let current_weight = entries.last()?.weight_kg;

    let seven_day = moving_average(entries, SHORT_WINDOW);
    let thirty_day = moving_average(entries, LONG_WINDOW);

    Some(WeightTrendReport {
        current_weight,
        seven_day_average: seven_day.last().copied().unwrap_or(current_weight),
        thirty_day_average: thirty_day.last().copied().unwrap_or(current_weight),
        weekly_change_rate: change_rate_per_week(entries),
        direction: detect_trend(entries),
        predicted_weight_30d: predict_weight(entries, 30),
        days_to_goal: days_to_goal(entries, goal_kg),
        standard_deviation: standard_deviation(entries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Build daily entries from a slice of weights, one day apart.
    fn daily_entries(weights: &[f64]) -> Vec<WeightEntry> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| WeightEntry::new(1, w, start + Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_moving_average_basic() {
        let entries = daily_entries(&[80.0, 81.0, 82.0, 83.0]);
        let avg = moving_average(&entries, 2);
        assert_eq!(avg, vec![80.5, 81.5, 82.5]);
    }

    #[test]
    fn test_moving_average_insufficient_data() {
        let entries = daily_entries(&[80.0, 81.0]);
        assert!(moving_average(&entries, 7).is_empty());
        assert!(moving_average(&entries, 0).is_empty());
    }

    #[test]
    fn test_change_rate_steady_loss() {
        // Losing exactly 0.1 kg/day
        let weights: Vec<f64> = (0..10).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        let rate = change_rate_per_day(&entries);
        assert!((rate - (-0.1)).abs() < 1e-9);
        assert!((change_rate_per_week(&entries) - (-0.7)).abs() < 1e-9);
    }

    #[test]
    fn test_change_rate_too_few_entries() {
        let entries = daily_entries(&[85.0]);
        assert_eq!(change_rate_per_day(&entries), 0.0);
        assert_eq!(change_rate_per_day(&[]), 0.0);
    }

    #[test]
    fn test_change_rate_same_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let entries = vec![
            WeightEntry::new(1, 80.0, at),
            WeightEntry::new(1, 81.0, at),
        ];
        // Degenerate x spread, no division by zero
        assert_eq!(change_rate_per_day(&entries), 0.0);
    }

    #[test]
    fn test_detect_trend_losing() {
        let weights: Vec<f64> = (0..14).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        assert_eq!(detect_trend(&entries), TrendDirection::Losing);
    }

    #[test]
    fn test_detect_trend_gaining() {
        let weights: Vec<f64> = (0..14).map(|i| 70.0 + 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        assert_eq!(detect_trend(&entries), TrendDirection::Gaining);
    }

    #[test]
    fn test_detect_trend_maintaining() {
        let weights: Vec<f64> = (0..14).map(|i| 75.0 + 0.001 * i as f64).collect();
        let entries = daily_entries(&weights);
        assert_eq!(detect_trend(&entries), TrendDirection::Maintaining);
    }

    #[test]
    fn test_detect_trend_insufficient() {
        let entries = daily_entries(&[80.0, 79.0, 78.0]);
        assert_eq!(detect_trend(&entries), TrendDirection::InsufficientData);
    }

    #[test]
    fn test_predict_weight() {
        // 0.1 kg/day loss over 20 days, current = 83.1
        let weights: Vec<f64> = (0..20).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        let predicted = predict_weight(&entries, 30);
        assert!((predicted - 80.1).abs() < 0.05);
    }

    #[test]
    fn test_predict_weight_needs_two_weeks() {
        let weights: Vec<f64> = (0..10).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        assert_eq!(predict_weight(&entries, 30), 0.0);
    }

    #[test]
    fn test_days_to_goal_reachable() {
        // Losing 0.1/day from 83.1 toward 80.0 -> ~31 days
        let weights: Vec<f64> = (0..20).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        let days = days_to_goal(&entries, 80.0).unwrap();
        assert!((30..=32).contains(&days));
    }

    #[test]
    fn test_days_to_goal_wrong_direction() {
        let weights: Vec<f64> = (0..20).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        // Gaining toward 90 while losing
        assert_eq!(days_to_goal(&entries, 90.0), None);
    }

    #[test]
    fn test_days_to_goal_no_progress() {
        let entries = daily_entries(&[75.0; 10]);
        assert_eq!(days_to_goal(&entries, 70.0), None);
        assert_eq!(days_to_goal(&[], 70.0), None);
    }

    #[test]
    fn test_standard_deviation() {
        let entries = daily_entries(&[80.0, 82.0, 80.0, 82.0]);
        assert_eq!(standard_deviation(&entries), 1.0);
        assert_eq!(standard_deviation(&daily_entries(&[80.0])), 0.0);
    }

    #[test]
    fn test_analyze_full_report() {
        let weights: Vec<f64> = (0..20).map(|i| 85.0 - 0.1 * i as f64).collect();
        let entries = daily_entries(&weights);
        let report = analyze(&entries, 80.0).unwrap();

        assert!((report.current_weight - 83.1).abs() < 1e-9);
        assert_eq!(report.direction, TrendDirection::Losing);
        assert!(report.days_to_goal.is_some());
        assert!(report.predicted_weight_30d > 0.0);
        // 30-day window not filled yet, falls back to current weight
        assert!((report.thirty_day_average - report.current_weight).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_empty() {
        assert!(analyze(&[], 80.0).is_none());
    }
}
