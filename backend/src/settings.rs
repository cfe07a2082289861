//! Portal configuration loaded via OrthoConfig.
//!
//! [`PortalSettings`] is the raw layered view (CLI, `PORTAL_*` environment,
//! config file, defaults). The server validates it into [`ServerSettings`]
//! before touching the network or the database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DeletionWindow, RetentionError, RetentionPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const MAX_DB_CONNECTIONS: u32 = 200;

/// Configuration values for the portal server and admin tooling.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a generated session key when the key file is unreadable.
    /// Off unless set.
    pub session_allow_ephemeral: Option<bool>,
    /// Mark the session cookie `Secure`. On unless set to false.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for the session cookie: `strict` or `lax`.
    pub same_site: Option<String>,
    /// Years archived reports are retained.
    pub retention_years: Option<u32>,
    /// Default look-ahead of the scheduled-deletion report.
    pub deletion_window_days: Option<u32>,
    /// Upper bound of the connection pool.
    pub db_max_connections: Option<u32>,
}

impl PortalSettings {
    /// Configured key file path, falling back to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }
}

/// Cookie `SameSite` policies the portal accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Never sent on cross-site requests.
    Strict,
    /// Sent on top-level cross-site navigation.
    Lax,
}

impl FromStr for SameSitePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            _ => Err(SettingsError::InvalidSameSite {
                value: s.to_owned(),
            }),
        }
    }
}

/// Validation failures that abort start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("PORTAL_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The bind address is not a socket address.
    #[error("invalid PORTAL_BIND_ADDR '{value}'; expected host:port")]
    InvalidBindAddr {
        /// Rejected value.
        value: String,
    },
    /// `SameSite` was neither `strict` nor `lax`.
    #[error("invalid PORTAL_SAME_SITE '{value}'; expected strict or lax")]
    InvalidSameSite {
        /// Rejected value.
        value: String,
    },
    /// Pool size outside the supported range.
    #[error("PORTAL_DB_MAX_CONNECTIONS must be between 1 and {max}")]
    InvalidMaxConnections {
        /// Largest supported value.
        max: u32,
    },
    /// Retention or deletion window out of range.
    #[error(transparent)]
    Retention(#[from] RetentionError),
}

/// Inputs the session layer needs to build its cookie key and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInputs {
    /// Key material location.
    pub key_file: PathBuf,
    /// Whether an unreadable key file may be replaced by a generated key.
    pub allow_ephemeral: bool,
    /// `Secure` cookie attribute.
    pub cookie_secure: bool,
    /// `SameSite` cookie attribute.
    pub same_site: SameSitePolicy,
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// PostgreSQL connection URL. Never logged.
    pub database_url: String,
    /// Listener address.
    pub bind_addr: SocketAddr,
    /// Session cookie inputs.
    pub session: SessionInputs,
    /// Archive retention.
    pub retention: RetentionPolicy,
    /// Default scheduled-deletion look-ahead.
    pub deletion_window: DeletionWindow,
    /// Pool upper bound.
    pub db_max_connections: u32,
}

impl TryFrom<PortalSettings> for ServerSettings {
    type Error = SettingsError;

    fn try_from(settings: PortalSettings) -> Result<Self, Self::Error> {
        let database_url = settings
            .database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;

        let raw_bind = settings
            .bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_bind
            .parse::<SocketAddr>()
            .map_err(|_| SettingsError::InvalidBindAddr { value: raw_bind })?;

        let same_site = settings
            .same_site
            .as_deref()
            .map(SameSitePolicy::from_str)
            .transpose()?
            .unwrap_or(SameSitePolicy::Lax);

        let retention = settings
            .retention_years
            .map(RetentionPolicy::new)
            .transpose()?
            .unwrap_or_default();
        let deletion_window = settings
            .deletion_window_days
            .map(DeletionWindow::new)
            .transpose()?
            .unwrap_or_default();

        let db_max_connections = settings
            .db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if !(1..=MAX_DB_CONNECTIONS).contains(&db_max_connections) {
            return Err(SettingsError::InvalidMaxConnections {
                max: MAX_DB_CONNECTIONS,
            });
        }

        Ok(Self {
            session: SessionInputs {
                key_file: settings.session_key_file(),
                allow_ephemeral: settings.session_allow_ephemeral.unwrap_or(false),
                cookie_secure: settings.cookie_secure.unwrap_or(true),
                same_site,
            },
            database_url,
            bind_addr,
            retention,
            deletion_window,
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Layered loading and validation of portal settings.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "PORTAL_DATABASE_URL",
        "PORTAL_BIND_ADDR",
        "PORTAL_SESSION_KEY_FILE",
        "PORTAL_SESSION_ALLOW_EPHEMERAL",
        "PORTAL_COOKIE_SECURE",
        "PORTAL_SAME_SITE",
        "PORTAL_RETENTION_YEARS",
        "PORTAL_DELETION_WINDOW_DAYS",
        "PORTAL_DB_MAX_CONNECTIONS",
    ];

    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> PortalSettings {
        PortalSettings::load_from_iter([OsString::from("transport-portal")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_only_the_database_is_configured() {
        let _guard = lock_env(env_with(&[(
            "PORTAL_DATABASE_URL",
            "postgres://portal@localhost/portal",
        )]));

        let settings = ServerSettings::try_from(load()).expect("valid settings");
        assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(
            settings.session.key_file,
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.session.cookie_secure);
        assert!(!settings.session.allow_ephemeral);
        assert_eq!(settings.session.same_site, SameSitePolicy::Lax);
        assert_eq!(settings.retention.years(), 5);
        assert_eq!(settings.deletion_window.days(), 90);
        assert_eq!(settings.db_max_connections, 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("PORTAL_DATABASE_URL", "postgres://portal@db/portal"),
            ("PORTAL_BIND_ADDR", "127.0.0.1:9000"),
            ("PORTAL_SESSION_KEY_FILE", "/tmp/portal-key"),
            ("PORTAL_SESSION_ALLOW_EPHEMERAL", "true"),
            ("PORTAL_COOKIE_SECURE", "false"),
            ("PORTAL_SAME_SITE", "Strict"),
            ("PORTAL_RETENTION_YEARS", "7"),
            ("PORTAL_DELETION_WINDOW_DAYS", "30"),
            ("PORTAL_DB_MAX_CONNECTIONS", "4"),
        ]));

        let settings = ServerSettings::try_from(load()).expect("valid settings");
        assert_eq!(settings.bind_addr.port(), 9000);
        assert_eq!(settings.session.key_file, PathBuf::from("/tmp/portal-key"));
        assert!(settings.session.allow_ephemeral);
        assert!(!settings.session.cookie_secure);
        assert_eq!(settings.session.same_site, SameSitePolicy::Strict);
        assert_eq!(settings.retention.years(), 7);
        assert_eq!(settings.deletion_window.days(), 30);
        assert_eq!(settings.db_max_connections, 4);
    }

    #[rstest]
    #[case(None, None, true, false)]
    #[case(Some("false"), None, false, false)]
    #[case(None, Some("true"), true, true)]
    #[case(Some("true"), Some("false"), true, false)]
    fn cookie_flags_default_to_secure_and_no_ephemeral_key(
        #[case] cookie_secure: Option<&str>,
        #[case] allow_ephemeral: Option<&str>,
        #[case] expect_secure: bool,
        #[case] expect_ephemeral: bool,
    ) {
        let mut overrides = vec![("PORTAL_DATABASE_URL", "postgres://x")];
        if let Some(value) = cookie_secure {
            overrides.push(("PORTAL_COOKIE_SECURE", value));
        }
        if let Some(value) = allow_ephemeral {
            overrides.push(("PORTAL_SESSION_ALLOW_EPHEMERAL", value));
        }
        let _guard = lock_env(env_with(&overrides));

        let settings = ServerSettings::try_from(load()).expect("valid settings");
        assert_eq!(settings.session.cookie_secure, expect_secure);
        assert_eq!(settings.session.allow_ephemeral, expect_ephemeral);
    }

    #[rstest]
    #[case(&[], SettingsError::MissingDatabaseUrl)]
    #[case(
        &[("PORTAL_DATABASE_URL", "postgres://x"), ("PORTAL_SAME_SITE", "none")],
        SettingsError::InvalidSameSite { value: "none".to_owned() }
    )]
    #[case(
        &[("PORTAL_DATABASE_URL", "postgres://x"), ("PORTAL_BIND_ADDR", "localhost")],
        SettingsError::InvalidBindAddr { value: "localhost".to_owned() }
    )]
    #[case(
        &[("PORTAL_DATABASE_URL", "postgres://x"), ("PORTAL_RETENTION_YEARS", "0")],
        SettingsError::Retention(RetentionError::InvalidYears { max: 50 })
    )]
    #[case(
        &[("PORTAL_DATABASE_URL", "postgres://x"), ("PORTAL_DB_MAX_CONNECTIONS", "0")],
        SettingsError::InvalidMaxConnections { max: MAX_DB_CONNECTIONS }
    )]
    fn invalid_values_abort_start_up(
        #[case] overrides: &[(&'static str, &str)],
        #[case] expected: SettingsError,
    ) {
        let _guard = lock_env(env_with(overrides));
        let err = ServerSettings::try_from(load()).expect_err("invalid settings");
        assert_eq!(err, expected);
    }
}
