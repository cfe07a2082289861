//! Port for report persistence.
//!
//! Every mutation pairs the report row with exactly one audit row, and
//! adapters must write both in one transaction. Updates are guarded by the
//! status the caller read: if another writer moved the report first, the
//! adapter reports [`ReportRepositoryError::StatusMismatch`] and writes
//! nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuditEntry, BarangayId, DashboardCounts, Report, ReportFilter, ReportId, ReportStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "report repository query failed: {message}",
        /// The report disappeared between read and write.
        NotFound { report_id: ReportId } =>
            "report {report_id} not found",
        /// The optimistic status guard did not match.
        StatusMismatch { expected: ReportStatus, actual: ReportStatus } =>
            "report status changed: expected {expected}, found {actual}",
        /// Another report already holds the generated code.
        DuplicateCode { code: String } =>
            "report code {code} is already taken",
    }
}

/// A guarded update of one report plus its audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportChange {
    /// Full replacement state of the report.
    pub report: Report,
    /// Status the report must still have for the write to apply.
    pub expected_status: ReportStatus,
    /// Audit row recording the change.
    pub audit: AuditEntry,
}

/// Durable storage for reports and their audit trail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new report and its `created` audit row atomically.
    async fn insert(&self, report: &Report, audit: &AuditEntry)
    -> Result<(), ReportRepositoryError>;

    /// Fetch a report within a barangay.
    ///
    /// Reports of other barangays are indistinguishable from missing ones.
    async fn find_by_id(
        &self,
        barangay_id: &BarangayId,
        report_id: &ReportId,
    ) -> Result<Option<Report>, ReportRepositoryError>;

    /// Apply a guarded change and append its audit row atomically.
    ///
    /// The update matches `id = change.report.id AND status =
    /// change.expected_status`. When no row matches, the adapter re-reads the
    /// report and returns [`ReportRepositoryError::StatusMismatch`] or
    /// [`ReportRepositoryError::NotFound`]; the audit row is not written.
    async fn apply_change(&self, change: &ReportChange) -> Result<(), ReportRepositoryError>;

    /// List reports matching `filter` ordered by `(created_at, id)` descending.
    ///
    /// Adapters return at most `filter.limit + 1` rows so callers can tell
    /// whether another page exists.
    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportRepositoryError>;

    /// Audit rows for a report, oldest first.
    async fn history(&self, report_id: &ReportId) -> Result<Vec<AuditEntry>, ReportRepositoryError>;

    /// Dashboard counters for a barangay.
    async fn dashboard_counts(
        &self,
        barangay_id: &BarangayId,
    ) -> Result<DashboardCounts, ReportRepositoryError>;

    /// Archived reports of a barangay due for deletion on or before
    /// `due_before`, ordered by deadline ascending.
    async fn scheduled_deletions(
        &self,
        barangay_id: &BarangayId,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<Report>, ReportRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn status_mismatch_names_both_statuses() {
        let error =
            ReportRepositoryError::status_mismatch(ReportStatus::Pending, ReportStatus::Rejected);
        assert_eq!(
            error.to_string(),
            "report status changed: expected pending, found rejected"
        );
    }
}
