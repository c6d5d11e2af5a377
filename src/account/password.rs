//! Password hashing with PBKDF2-HMAC-SHA256.
//!
//! Stored format: `iterations$salt_hex$derived_key_hex`. Verification
//! re-derives with the stored parameters, so the iteration count can be
//! raised for new hashes without invalidating old ones.

use std::num::NonZeroU32;

use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, pbkdf2};

use super::AccountError;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = digest::SHA256_OUTPUT_LEN;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| AccountError::Hashing("failed to generate salt".to_string()))?;

    let iterations = NonZeroU32::new(PBKDF2_ITERATIONS)
        .ok_or_else(|| AccountError::Hashing("invalid iteration count".to_string()))?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut key);

    Ok(format!(
        "{}${}${}",
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(key)
    ))
}

/// Verify a password against a stored hash. Returns false for wrong
/// passwords, errors only on a malformed stored hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AccountError> {
    let mut parts = stored.splitn(3, '$');
    let (iterations_str, salt_hex, key_hex) = match (parts.next(), parts.next(), parts.next()) {
        (Some(i), Some(s), Some(k)) => (i, s, k),
        _ => return Err(AccountError::Hashing("malformed password hash".to_string())),
    };

    let iterations: u32 = iterations_str
        .parse()
        .map_err(|_| AccountError::Hashing("malformed iteration count".to_string()))?;
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| AccountError::Hashing("malformed iteration count".to_string()))?;

    let salt =
        hex::decode(salt_hex).map_err(|_| AccountError::Hashing("malformed salt".to_string()))?;
    let key =
        hex::decode(key_hex).map_err(|_| AccountError::Hashing("malformed key".to_string()))?;

    Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &key).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Secret123").unwrap();
        assert!(verify_password("Secret123", &hash).unwrap());
        assert!(!verify_password("WrongPass1", &hash).unwrap());
    }

    #[test]
    fn test_hash_format() {
        let hash = hash_password("Secret123").unwrap();
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "100000");
        assert_eq!(parts[1].len(), SALT_LEN * 2);
        assert_eq!(parts[2].len(), KEY_LEN * 2);
    }

    #[test]
    fn test_unique_salts() {
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("Secret123", "not-a-hash").is_err());
        assert!(verify_password("Secret123", "abc$def$ghi").is_err());
    }
}
