//! PostgreSQL-backed `BarangayRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BarangayRepository, BarangayRepositoryError};
use crate::domain::{Barangay, BarangayId};

use super::diesel_helpers::{self, DieselErrorMapping};
use super::models::{BarangayRow, NewBarangayRow};
use super::pool::DbPool;
use super::schema::barangays;

/// Diesel-backed implementation of the barangay repository port.
#[derive(Clone)]
pub struct DieselBarangayRepository {
    pool: DbPool,
}

impl DieselBarangayRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error<'a>(
    error: diesel::result::Error,
    name: Option<&'a str>,
) -> BarangayRepositoryError {
    diesel_helpers::map_diesel_error(
        error,
        DieselErrorMapping {
            query: BarangayRepositoryError::query,
            connection: BarangayRepositoryError::connection,
            duplicate: name.map(|name| move || BarangayRepositoryError::duplicate_name(name)),
        },
    )
}

#[async_trait]
impl BarangayRepository for DieselBarangayRepository {
    async fn insert(&self, barangay: &Barangay) -> Result<(), BarangayRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| diesel_helpers::map_pool_error(err, BarangayRepositoryError::connection))?;
        diesel::insert_into(barangays::table)
            .values(NewBarangayRow::from(barangay))
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| map_diesel_error(err, Some(&barangay.name)))
    }

    async fn find_by_id(
        &self,
        id: &BarangayId,
    ) -> Result<Option<Barangay>, BarangayRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| diesel_helpers::map_pool_error(err, BarangayRepositoryError::connection))?;
        let row = barangays::table
            .filter(barangays::id.eq(*id.as_uuid()))
            .select(BarangayRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(row.map(Barangay::from))
    }
}
