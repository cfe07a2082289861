//! Argon2 password hashing shared by the login adapter and `portal-admin`.
//!
//! Hashes are PHC strings, so the algorithm, parameters and salt travel with
//! the stored value.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Failures while hashing or parsing a stored hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
    /// The stored value is not a PHC string.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash { message: String },
}

/// Hash `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if argon2 rejects the input.
///
/// # Examples
///
/// ```
/// use transport_portal::outbound::password::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse").expect("hash");
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("correct horse", &hash).expect("verify"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash {
            message: err.to_string(),
        })
}

/// Check `password` against a stored PHC hash.
///
/// # Errors
///
/// Returns [`PasswordError::MalformedHash`] when `stored` cannot be parsed. A
/// wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|err| PasswordError::MalformedHash {
        message: err.to_string(),
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn salts_differ_between_hashes() {
        let first = hash_password("barangay").expect("hash");
        let second = hash_password("barangay").expect("hash");
        assert_ne!(first, second);
        assert!(verify_password("barangay", &first).expect("verify"));
        assert!(verify_password("barangay", &second).expect("verify"));
    }

    #[rstest]
    fn wrong_passwords_do_not_verify() {
        let hash = hash_password("barangay").expect("hash");
        assert!(!verify_password("Barangay", &hash).expect("verify"));
    }

    #[rstest]
    fn malformed_hashes_are_errors() {
        let err = verify_password("barangay", "plaintext").expect_err("malformed");
        assert!(matches!(err, PasswordError::MalformedHash { .. }));
    }
}
