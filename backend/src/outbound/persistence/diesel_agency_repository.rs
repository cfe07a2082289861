//! PostgreSQL-backed `AgencyRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AgencyRepository, AgencyRepositoryError};
use crate::domain::{Agency, AgencyId};

use super::diesel_helpers::{self, DieselErrorMapping, NoDuplicate, collect_rows};
use super::models::{AgencyRow, NewAgencyRow};
use super::pool::{DbPool, PoolError};
use super::schema::referral_agencies;

/// Diesel-backed implementation of the agency repository port.
#[derive(Clone)]
pub struct DieselAgencyRepository {
    pool: DbPool,
}

impl DieselAgencyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AgencyRepositoryError {
    diesel_helpers::map_pool_error(error, AgencyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AgencyRepositoryError {
    diesel_helpers::map_diesel_error(
        error,
        DieselErrorMapping {
            query: AgencyRepositoryError::query,
            connection: AgencyRepositoryError::connection,
            duplicate: None::<NoDuplicate<AgencyRepositoryError>>,
        },
    )
}

#[async_trait]
impl AgencyRepository for DieselAgencyRepository {
    async fn insert(&self, agency: &Agency) -> Result<(), AgencyRepositoryError> {
        let row = NewAgencyRow::try_from(agency).map_err(AgencyRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(referral_agencies::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| {
                diesel_helpers::map_diesel_error(
                    err,
                    DieselErrorMapping {
                        query: AgencyRepositoryError::query,
                        connection: AgencyRepositoryError::connection,
                        duplicate: Some(|| AgencyRepositoryError::duplicate_name(agency.name.as_str())),
                    },
                )
            })
    }

    async fn find_by_id(&self, id: &AgencyId) -> Result<Option<Agency>, AgencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = referral_agencies::table
            .filter(referral_agencies::id.eq(*id.as_uuid()))
            .select(AgencyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Agency::try_from)
            .transpose()
            .map_err(AgencyRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<Agency>, AgencyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AgencyRow> = referral_agencies::table
            .order((referral_agencies::name.asc(), referral_agencies::id.asc()))
            .select(AgencyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(Agency::try_from), AgencyRepositoryError::query)
    }
}
