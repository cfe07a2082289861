//! Session cookie key and flag resolution.
//!
//! Turns the validated [`SessionInputs`] into the key and cookie attributes
//! the session middleware needs. Key material never leaves this module except
//! as an [`actix_web::cookie::Key`] and a truncated fingerprint.

pub mod fingerprint;

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroizing;

use crate::settings::{SameSitePolicy, SessionInputs};

const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds may always fall back to a generated key.
    Debug,
    /// Release builds need the key file unless ephemeral keys are allowed.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use transport_portal::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Resolved session middleware settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while resolving the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Reading the session key file failed and no fallback is permitted.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file holds too little material.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Resolve the session key and cookie flags.
///
/// # Examples
///
/// ```rust
/// use transport_portal::inbound::http::session_config::{session_settings, BuildMode};
/// use transport_portal::settings::{SameSitePolicy, SessionInputs};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("portal_session_key_example");
/// std::fs::write(&key_path, vec![b'a'; 64])?;
///
/// let inputs = SessionInputs {
///     key_file: key_path.clone(),
///     allow_ephemeral: false,
///     cookie_secure: true,
///     same_site: SameSitePolicy::Strict,
/// };
/// let settings = session_settings(&inputs, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
///
/// std::fs::remove_file(&key_path)?;
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    inputs: &SessionInputs,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    if !inputs.cookie_secure {
        warn!("session cookie is not marked Secure");
    }
    Ok(SessionSettings {
        key: session_key(inputs, mode)?,
        cookie_secure: inputs.cookie_secure,
        same_site: match inputs.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
        },
    })
}

fn session_key(inputs: &SessionInputs, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let path = inputs.key_file.clone();
    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(error) => {
            if mode.is_debug() || inputs.allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key; sessions will not survive a restart"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}
