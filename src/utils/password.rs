use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, phc::PasswordHash},
};

use crate::error::{AppError, AppResult};

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes())
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to hash password: {}", e),
        })
}

/// Verify a password against a stored hash
///
/// A malformed hash is an internal error, a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Stored password hash is malformed: {}", e),
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("Secret123").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Secret123").expect("Failed to hash password");

        assert!(verify_password("Secret123", &hash).unwrap());
        assert!(!verify_password("secret123", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let first = hash_password("Secret123").unwrap();
        let second = hash_password("Secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(verify_password("Secret123", "plaintext").is_err());
    }
}
