use anyhow::anyhow;
use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes with an explicit bcrypt cost. Low costs are only meant for tests.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::bad_request("password must not be empty"));
    }

    hash(password, cost).map_err(|e| AppError::internal(anyhow!("failed to hash password: {e}")))
}

/// An empty password never verifies, whatever the stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.is_empty() {
        return Ok(false);
    }

    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password_with_cost("gophers", TEST_COST).unwrap();
        assert_ne!(hashed, "gophers");
        assert!(verify_password("gophers", &hashed).unwrap());
        assert!(!verify_password("GOPHERS", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password_with_cost("gophers", TEST_COST).unwrap();
        let second = hash_password_with_cost("gophers", TEST_COST).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            hash_password_with_cost("", TEST_COST),
            Err(AppError::InvalidInput { .. })
        ));

        let hashed = hash_password_with_cost("gophers", TEST_COST).unwrap();
        assert!(!verify_password("", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("gophers", "not-a-bcrypt-hash"),
            Err(AppError::Internal(_))
        ));
    }
}
