//! Referral agency domain service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{AgencyRegistry, AgencyRepository, AgencyRepositoryError};
use crate::domain::{Actor, Agency, AgencyDraft, AgencyId, Error};

fn map_repository_error(error: AgencyRepositoryError) -> Error {
    match error {
        AgencyRepositoryError::Connection { message } => {
            Error::store_unavailable("agency store", &message)
        }
        AgencyRepositoryError::Query { message } => {
            Error::internal(format!("agency repository error: {message}"))
        }
        AgencyRepositoryError::DuplicateName { name } => {
            Error::conflict(format!("an agency named {name} already exists"))
                .with_details(json!({ "field": "name" }))
        }
    }
}

/// Agency service implementing [`AgencyRegistry`].
#[derive(Clone)]
pub struct AgencyService<A> {
    agencies: Arc<A>,
}

impl<A> AgencyService<A> {
    /// Create a new service over the agency repository.
    pub fn new(agencies: Arc<A>) -> Self {
        Self { agencies }
    }
}

#[async_trait]
impl<A> AgencyRegistry for AgencyService<A>
where
    A: AgencyRepository,
{
    async fn add_agency(&self, actor: &Actor, draft: AgencyDraft) -> Result<Agency, Error> {
        actor.require_admin()?;
        let agency = draft.into_agency(AgencyId::random(), Utc::now());
        if let Err(err) = self.agencies.insert(&agency).await {
            if matches!(err, AgencyRepositoryError::DuplicateName { .. }) {
                warn!(name = %agency.name, actor = %actor.user_id(), "duplicate agency name");
            }
            return Err(map_repository_error(err));
        }
        info!(agency_id = %agency.id, actor = %actor.user_id(), "agency registered");
        Ok(agency)
    }

    async fn list_agencies(&self, actor: &Actor) -> Result<Vec<Agency>, Error> {
        actor.require_staff()?;
        self.agencies.list().await.map_err(map_repository_error)
    }
}
