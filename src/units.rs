//! Weight unit handling and conversion.
//!
//! Weights are stored in kilograms throughout the database; conversion to
//! the user's preferred unit happens at the display/input edges.

use serde::{Deserialize, Serialize};

const LBS_TO_KG: f64 = 0.45359237;
const KG_TO_LBS: f64 = 2.20462262;

/// Weight unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Kilograms (canonical storage unit)
    #[default]
    Kg,
    /// Pounds
    Lbs,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Kg => write!(f, "kg"),
            Unit::Lbs => write!(f, "lbs"),
        }
    }
}

impl Unit {
    /// Parse a unit label ("kg" or "lbs", case-insensitive).
    pub fn parse(s: &str) -> Option<Unit> {
        match s.to_lowercase().as_str() {
            "kg" => Some(Unit::Kg),
            "lbs" | "lb" => Some(Unit::Lbs),
            _ => None,
        }
    }

    /// Lower plausibility bound for a body weight in this unit.
    pub fn min_weight(self) -> f64 {
        match self {
            Unit::Kg => 20.0,
            Unit::Lbs => 44.0,
        }
    }

    /// Upper plausibility bound for a body weight in this unit.
    pub fn max_weight(self) -> f64 {
        match self {
            Unit::Kg => 300.0,
            Unit::Lbs => 661.0,
        }
    }
}

/// Convert pounds to kilograms.
pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs * LBS_TO_KG
}

/// Convert kilograms to pounds.
pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * KG_TO_LBS
}

/// Convert a weight between units. Identity when the units match.
pub fn convert(weight: f64, from: Unit, to: Unit) -> f64 {
    match (from, to) {
        (Unit::Kg, Unit::Lbs) => kg_to_lbs(weight),
        (Unit::Lbs, Unit::Kg) => lbs_to_kg(weight),
        _ => weight,
    }
}

/// Format a weight with its unit label, e.g. "84.2 kg".
pub fn format_weight(weight: f64, unit: Unit, decimals: usize) -> String {
    format!("{weight:.decimals$} {unit}")
}

/// Check a weight against the plausibility range for the given unit.
pub fn is_valid_weight(weight: f64, unit: Unit) -> bool {
    weight > 0.0 && weight >= unit.min_weight() && weight <= unit.max_weight()
}

/// Parse a weight input string, rejecting non-numeric or out-of-range values.
pub fn parse_weight(input: &str, unit: Unit) -> Option<f64> {
    let weight: f64 = input.trim().parse().ok()?;
    if is_valid_weight(weight, unit) {
        Some(weight)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_conversion() {
        let kg = 80.0;
        let back = lbs_to_kg(kg_to_lbs(kg));
        assert!((back - kg).abs() < 1e-6);
    }

    #[test]
    fn test_convert_identity() {
        assert_eq!(convert(72.5, Unit::Kg, Unit::Kg), 72.5);
        assert_eq!(convert(160.0, Unit::Lbs, Unit::Lbs), 160.0);
    }

    #[test]
    fn test_known_conversion() {
        // 100 lbs = 45.359237 kg
        assert!((lbs_to_kg(100.0) - 45.359237).abs() < 1e-6);
    }

    #[test]
    fn test_valid_weight_ranges() {
        assert!(is_valid_weight(75.0, Unit::Kg));
        assert!(!is_valid_weight(10.0, Unit::Kg));
        assert!(!is_valid_weight(350.0, Unit::Kg));
        assert!(is_valid_weight(165.0, Unit::Lbs));
        assert!(!is_valid_weight(30.0, Unit::Lbs));
        assert!(!is_valid_weight(-5.0, Unit::Lbs));
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(" 82.4 ", Unit::Kg), Some(82.4));
        assert_eq!(parse_weight("abc", Unit::Kg), None);
        assert_eq!(parse_weight("1000", Unit::Lbs), None);
        assert_eq!(parse_weight("", Unit::Kg), None);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(84.25, Unit::Kg, 1), "84.2 kg");
        assert_eq!(format_weight(185.5, Unit::Lbs, 1), "185.5 lbs");
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(Unit::parse("KG"), Some(Unit::Kg));
        assert_eq!(Unit::parse("lb"), Some(Unit::Lbs));
        assert_eq!(Unit::parse("stone"), None);
    }
}
