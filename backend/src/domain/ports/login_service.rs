//! Driving ports for authentication and session actor resolution.
//!
//! Handlers depend on these traits rather than on the user table, so HTTP
//! tests can substitute doubles without wiring persistence.

use async_trait::async_trait;

use crate::domain::{Actor, Error, LoginCredentials, UserId};

/// Credential check performed by `POST /login`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated actor.
    ///
    /// Unknown usernames and wrong passwords both yield `401 invalid
    /// credentials`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error>;
}

/// Re-reads the actor behind a session on every request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Current actor for `user_id`, or `None` when the account is gone.
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Actor>, Error>;
}
