//! Argon2 password hashing

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::utils::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// A malformed stored hash never verifies
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("wasabi-2026").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("wasabi-2026", &hash));
        assert!(!verify_password("wasabi-2027", &hash));
        assert!(!verify_password("wasabi-2026", "not-a-hash"));
    }
}
