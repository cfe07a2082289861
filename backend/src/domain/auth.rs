//! Login credentials.
//!
//! Handlers build [`LoginCredentials`] from the request body before talking to
//! the login port, so adapters only ever see trimmed, bounded input.

use zeroize::Zeroizing;

const USERNAME_MAX: usize = 64;
// Argon2 cost grows with input length; cap what an anonymous caller can send.
const PASSWORD_MAX: usize = 1024;

/// Reasons a login payload is rejected before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username longer than any stored account name.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password exceeds the accepted length.
    #[error("password must be at most {max} bytes")]
    PasswordTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty, kept verbatim and zeroed on drop.
///
/// # Examples
/// ```
/// use transport_portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" kagawad.cruz ", "s3cret").expect("valid");
/// assert_eq!(creds.username(), "kagawad.cruz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw username and password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(LoginValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        if password.len() > PASSWORD_MAX {
            return Err(LoginValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }

        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the account lookup.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password exactly as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("tanod.ramos", "", LoginValidationError::EmptyPassword)]
    fn blank_fields_are_rejected(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn oversized_passwords_are_rejected() {
        let password = "x".repeat(PASSWORD_MAX + 1);
        let err = LoginCredentials::try_from_parts("admin", &password).expect_err("too long");
        assert_eq!(err, LoginValidationError::PasswordTooLong { max: PASSWORD_MAX });
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("admin", " pass phrase ").expect("valid");
        assert_eq!(creds.password(), " pass phrase ");
    }
}
