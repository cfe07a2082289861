//! Port for referral agency persistence.

use async_trait::async_trait;

use crate::domain::{Agency, AgencyId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by agency repository adapters.
    pub enum AgencyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "agency repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "agency repository query failed: {message}",
        /// Another agency already uses the name.
        DuplicateName { name: String } =>
            "an agency named {name} already exists",
    }
}

/// Durable storage for referral agencies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgencyRepository: Send + Sync {
    /// Insert a new agency; names are unique case-insensitively.
    async fn insert(&self, agency: &Agency) -> Result<(), AgencyRepositoryError>;

    /// Fetch an agency by id.
    async fn find_by_id(&self, id: &AgencyId) -> Result<Option<Agency>, AgencyRepositoryError>;

    /// All agencies ordered by name.
    async fn list(&self) -> Result<Vec<Agency>, AgencyRepositoryError>;
}
