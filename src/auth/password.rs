//! Password hashing and verification with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) carrying
//! their own salt and cost parameters, so [`verify_password`] needs nothing but
//! the stored string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Hashes `password` with a fresh random salt. Two calls never return the same string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::HashError(format!("can not get hash from password: {}", e)))?;

    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::HashError(format!("invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn verify_accepts_only_original_password() {
        let hash = hash_password("secret").unwrap();

        assert!(verify_password(&hash, "secret").unwrap());
        assert!(!verify_password(&hash, "Secret").unwrap());
        assert!(!verify_password(&hash, "").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = verify_password("not-a-phc-string", "secret").unwrap_err();
        assert!(matches!(err, AppError::HashError(_)));
    }
}
