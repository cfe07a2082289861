//! Resolves session user ids to current actors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{ActorDirectory, UserRepository, UserRepositoryError};
use crate::domain::{Actor, Error, UserId};

/// [`ActorDirectory`] backed by the user repository.
#[derive(Clone)]
pub struct UserActorDirectory<U> {
    users: Arc<U>,
}

impl<U> UserActorDirectory<U> {
    /// Create a directory over the user repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> ActorDirectory for UserActorDirectory<U>
where
    U: UserRepository,
{
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Actor>, Error> {
        let account = self.users.find_by_id(user_id).await.map_err(|err| match err {
            UserRepositoryError::Connection { message } => {
                Error::store_unavailable("user store", &message)
            }
            other => Error::internal(format!("user repository error: {other}")),
        })?;
        Ok(account.map(|account| account.actor()))
    }
}
