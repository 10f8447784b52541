//! Argon2id password hashing for remote-mode identities.
//!
//! Hashes are stored in PHC string format, so the salt and parameters travel
//! with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use wayfarer_core::error::{CoreError, CoreResult};

/// Shortest password accepted at sign-up, update, and reset.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn hashing_failure(err: argon2::password_hash::Error) -> CoreError {
    CoreError::BackendFailure(format!("Password hashing failed: {err}"))
}

pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(hashing_failure)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only for an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(hashing_failure)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hashing_failure(e)),
    }
}

pub fn validate_password_strength(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("lisbon-2026").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("lisbon-2026", &hash).unwrap());
        assert!(!verify_password("porto-2026", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert_matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(CoreError::BackendFailure(_))
        );
    }

    #[test]
    fn minimum_length_is_six() {
        assert!(validate_password_strength("abcdef").is_ok());
        assert_matches!(
            validate_password_strength("abcde"),
            Err(CoreError::Validation(msg)) if msg.contains("at least 6")
        );
    }
}
