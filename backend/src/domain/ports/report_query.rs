//! Driving port for report reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::{Actor, AuditEntry, Error, Report, ReportFilterInput, ReportId};

/// Archived reports whose retention window closes within the look-ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSchedule {
    /// Look-ahead used for the listing.
    pub within_days: u32,
    /// Latest deadline included.
    pub due_before: DateTime<Utc>,
    /// Matching reports, earliest deadline first.
    pub reports: Vec<Report>,
}

/// Report read use-cases, scoped to the actor's barangay.
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Fetch one report.
    async fn report(&self, actor: &Actor, report_id: &ReportId) -> Result<Report, Error>;

    /// List reports matching a filter.
    async fn list_reports(
        &self,
        actor: &Actor,
        filter: ReportFilterInput,
    ) -> Result<Page<Report>, Error>;

    /// Audit trail of one report, oldest first.
    async fn history(&self, actor: &Actor, report_id: &ReportId)
    -> Result<Vec<AuditEntry>, Error>;

    /// Archived reports due for deletion within `within_days`.
    ///
    /// `None` uses the configured window.
    async fn scheduled_deletions(
        &self,
        actor: &Actor,
        within_days: Option<u32>,
    ) -> Result<DeletionSchedule, Error>;
}
