//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{UserAccount, UserId};

use super::diesel_helpers::{self, DieselErrorMapping, NoDuplicate};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    diesel_helpers::map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    diesel_helpers::map_diesel_error(
        error,
        DieselErrorMapping {
            query: UserRepositoryError::query,
            connection: UserRepositoryError::connection,
            duplicate: None::<NoDuplicate<UserRepositoryError>>,
        },
    )
}

fn to_account(row: Option<UserRow>) -> Result<Option<UserAccount>, UserRepositoryError> {
    row.map(UserAccount::try_from)
        .transpose()
        .map_err(UserRepositoryError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(*id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_account(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        to_account(row)
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(account))
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| {
                diesel_helpers::map_diesel_error(
                    err,
                    DieselErrorMapping {
                        query: UserRepositoryError::query,
                        connection: UserRepositoryError::connection,
                        duplicate: Some(|| {
                            UserRepositoryError::duplicate_username(account.username.as_str())
                        }),
                    },
                )
            })
    }
}
