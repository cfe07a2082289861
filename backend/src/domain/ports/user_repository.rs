//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } =>
            "username {username} is already taken",
    }
}

/// Durable storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Fetch an account by its exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Insert a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError>;
}
