//! Input validation for registration and profile updates.

use once_cell::sync::Lazy;
use regex::Regex;

use super::AccountError;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{4,20}$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").unwrap());
static PHONE_FORMATTING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s()\-]").unwrap());

const MAX_WEIGHT_KG: f64 = 500.0;

/// Usernames are 4-20 characters: letters, numbers, underscores.
pub fn validate_username(username: &str) -> Result<(), AccountError> {
    if username.trim().is_empty() {
        return Err(AccountError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(AccountError::Validation(
            "Username must be 4-20 characters (letters, numbers, underscores only)".to_string(),
        ));
    }
    Ok(())
}

/// Passwords need 8+ characters with at least one lowercase letter, one
/// uppercase letter, and one digit.
pub fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.trim().is_empty() {
        return Err(AccountError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    if password.len() < 8 {
        return Err(AccountError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(AccountError::Validation(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                .to_string(),
        ));
    }
    Ok(())
}

/// Phone numbers must be 10 digits after stripping spaces, parentheses,
/// and dashes. Returns the cleaned digits.
pub fn validate_phone(phone: &str) -> Result<String, AccountError> {
    if phone.trim().is_empty() {
        return Err(AccountError::Validation(
            "Phone number cannot be empty".to_string(),
        ));
    }

    let cleaned = PHONE_FORMATTING_RE.replace_all(phone, "").to_string();
    if !PHONE_RE.is_match(&cleaned) {
        return Err(AccountError::Validation(
            "Phone number must be 10 digits".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Weights must be positive and below 500 kg.
pub fn validate_weight(weight_kg: f64) -> Result<(), AccountError> {
    if weight_kg <= 0.0 {
        return Err(AccountError::Validation(
            "Weight must be greater than 0".to_string(),
        ));
    }
    if weight_kg > MAX_WEIGHT_KG {
        return Err(AccountError::Validation(
            "Weight must be less than 500 kg".to_string(),
        ));
    }
    Ok(())
}

/// Goal weights follow the same rules as logged weights.
pub fn validate_goal_weight(goal_kg: f64) -> Result<(), AccountError> {
    validate_weight(goal_kg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_valid() {
        assert!(validate_username("alice_99").is_ok());
        assert!(validate_username("bob1").is_ok());
    }

    #[test]
    fn test_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("abc").is_err()); // too short
        assert!(validate_username("a".repeat(21).as_str()).is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("nope!").is_err());
    }

    #[test]
    fn test_password_valid() {
        assert!(validate_password("Secret123").is_ok());
    }

    #[test]
    fn test_password_invalid() {
        assert!(validate_password("").is_err());
        assert!(validate_password("Short1").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_phone_accepts_formatting() {
        assert_eq!(validate_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(validate_phone("5551234567").unwrap(), "5551234567");
    }

    #[test]
    fn test_phone_invalid() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("555123456789").is_err());
        assert!(validate_phone("555-123-456a").is_err());
    }

    #[test]
    fn test_weight_bounds() {
        assert!(validate_weight(75.0).is_ok());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(-5.0).is_err());
        assert!(validate_weight(500.1).is_err());
        assert!(validate_goal_weight(80.0).is_ok());
    }
}
