//! Driving port for report lifecycle mutations.
//!
//! Inbound adapters resolve the [`Actor`] from the session and call this
//! port; authorisation, the transition table and auditing all live behind it.

use async_trait::async_trait;

use crate::domain::{Actor, AgencyId, Error, Report, ReportDraft, ReportId, ReportStatus, UserId};

/// Move a report along the generic transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Report to move.
    pub report_id: ReportId,
    /// Desired status.
    pub target: ReportStatus,
    /// Status the caller last saw; a mismatch is a conflict.
    pub expected_status: Option<ReportStatus>,
    /// Free-text note stored on the audit row.
    pub notes: Option<String>,
}

/// Assign a report to a Tanod or Employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRequest {
    /// Report to assign.
    pub report_id: ReportId,
    /// Account taking the report.
    pub assignee: UserId,
    /// Free-text note stored on the audit row.
    pub notes: Option<String>,
}

/// Refer a report to an external agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferRequest {
    /// Report to refer.
    pub report_id: ReportId,
    /// Receiving agency.
    pub agency_id: AgencyId,
    /// Why the report leaves the barangay's hands.
    pub reason: String,
    /// Free-text note stored on the audit row.
    pub notes: Option<String>,
}

/// Archive or unarchive a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// Report to (un)archive.
    pub report_id: ReportId,
    /// Free-text note stored on the audit row.
    pub notes: Option<String>,
}

/// Report lifecycle commands.
///
/// Every successful call writes exactly one audit row and returns the report
/// as stored.
#[async_trait]
pub trait ReportCommand: Send + Sync {
    /// File a new pending report.
    async fn submit_report(&self, actor: &Actor, draft: ReportDraft) -> Result<Report, Error>;

    /// Apply a generic status transition.
    async fn transition(&self, actor: &Actor, request: TransitionRequest)
    -> Result<Report, Error>;

    /// Assign or reassign a report.
    async fn assign(&self, actor: &Actor, request: AssignRequest) -> Result<Report, Error>;

    /// Refer a report to an agency.
    async fn refer(&self, actor: &Actor, request: ReferRequest) -> Result<Report, Error>;

    /// Archive a closed report under the retention policy.
    async fn archive(&self, actor: &Actor, request: ArchiveRequest) -> Result<Report, Error>;

    /// Restore an archived report to the status it was archived from.
    async fn unarchive(&self, actor: &Actor, request: ArchiveRequest) -> Result<Report, Error>;
}
