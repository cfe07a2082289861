//! Driving port for the referral agency lookup.

use async_trait::async_trait;

use crate::domain::{Actor, Agency, AgencyDraft, Error};

/// Agency registration and listing.
#[async_trait]
pub trait AgencyRegistry: Send + Sync {
    /// Register a new agency. Administrators only.
    async fn add_agency(&self, actor: &Actor, draft: AgencyDraft) -> Result<Agency, Error>;

    /// List agencies by name. Staff only.
    async fn list_agencies(&self, actor: &Actor) -> Result<Vec<Agency>, Error>;
}
