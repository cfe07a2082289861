//! Password `LoginService` over the user repository.
//!
//! Credentials are checked against the stored argon2 hash off the async
//! runtime. Unknown usernames still pay for one verification against a
//! throwaway hash, and every rejection carries the same message.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{LoginService, UserRepository, UserRepositoryError};
use crate::domain::{Actor, Error, LoginCredentials};
use crate::outbound::password::{hash_password, verify_password};

use super::diesel_user_repository::DieselUserRepository;

const REJECTION: &str = "invalid credentials";

static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("decoy password for unknown accounts").ok());

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::store_unavailable("user store", &message)
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Run argon2 verification on the blocking pool.
async fn verify_off_runtime(password: Zeroizing<String>, stored: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || verify_password(password.as_str(), &stored))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
        .map_err(|err| {
            error!(error = %err, "stored password hash is unusable");
            Error::internal("stored password hash is unusable")
        })
}

/// Diesel-backed `LoginService` checking argon2 password hashes.
#[derive(Clone)]
pub struct DieselLoginService {
    user_repository: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    /// Create a new service backed by a Diesel user repository.
    pub fn new(user_repository: DieselUserRepository) -> Self {
        Self {
            user_repository: Arc::new(user_repository),
        }
    }

    #[cfg(test)]
    fn from_repository(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        let account = self
            .user_repository
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?;
        let password = Zeroizing::new(credentials.password().to_owned());

        let Some(account) = account else {
            if let Some(decoy) = DECOY_HASH.as_ref() {
                let _ = verify_off_runtime(password, decoy.clone()).await;
            }
            debug!(username = credentials.username(), "login for unknown username");
            return Err(Error::unauthorized(REJECTION));
        };

        if !verify_off_runtime(password, account.password_hash.clone()).await? {
            debug!(user_id = %account.id, "login with wrong password");
            return Err(Error::unauthorized(REJECTION));
        }

        info!(user_id = %account.id, role = %account.role, "user logged in");
        Ok(account.actor())
    }
}
