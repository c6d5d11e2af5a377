//! User accounts: registration input rules, credential hashing, and the
//! persisted user profile.

pub mod password;
pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::Unit;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Deliberately identical for unknown user and wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken: {0}")]
    UsernameTaken(String),
}

/// A registered user. The password is stored only as a PBKDF2 hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Goal weight in kg
    pub goal_weight_kg: f64,
    /// Cleaned 10-digit phone number
    pub phone_number: String,
    pub preferred_unit: Unit,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from already-validated registration inputs.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        goal_weight_kg: f64,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            password_hash: password_hash.into(),
            goal_weight_kg,
            phone_number: phone_number.into(),
            preferred_unit: Unit::default(),
            created_at: Utc::now(),
        }
    }
}

/// Validate registration inputs and produce an unpersisted user with a
/// hashed password.
pub fn register(
    username: &str,
    password: &str,
    goal_weight_kg: f64,
    phone: &str,
) -> Result<User, AccountError> {
    validation::validate_username(username)?;
    validation::validate_password(password)?;
    validation::validate_goal_weight(goal_weight_kg)?;
    let cleaned_phone = validation::validate_phone(phone)?;

    let hash = password::hash_password(password)?;
    Ok(User::new(username, hash, goal_weight_kg, cleaned_phone))
}

/// Check a login attempt against a stored user.
///
/// The error never distinguishes a bad password from a missing user; the
/// caller maps an unknown username to the same [`AccountError::InvalidCredentials`].
pub fn authenticate(user: &User, password: &str) -> Result<(), AccountError> {
    if password::verify_password(password, &user.password_hash)? {
        Ok(())
    } else {
        Err(AccountError::InvalidCredentials)
    }
}
