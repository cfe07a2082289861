//! Port for barangay persistence.

use async_trait::async_trait;

use crate::domain::{Barangay, BarangayId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by barangay repository adapters.
    pub enum BarangayRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "barangay repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "barangay repository query failed: {message}",
        /// Another barangay already uses the name.
        DuplicateName { name: String } =>
            "a barangay named {name} already exists",
    }
}

/// Durable storage for barangays.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BarangayRepository: Send + Sync {
    /// Insert a new barangay.
    async fn insert(&self, barangay: &Barangay) -> Result<(), BarangayRepositoryError>;

    /// Fetch a barangay by id.
    async fn find_by_id(&self, id: &BarangayId)
    -> Result<Option<Barangay>, BarangayRepositoryError>;
}
