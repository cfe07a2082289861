//! Append-only audit trail entries for report changes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuditEntryId, ReportId, UserId};

use super::ReportStatus;

/// Kind of change recorded by an audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The report was filed.
    Created,
    /// Generic status transition.
    StatusChanged,
    /// The report was (re)assigned.
    Assigned,
    /// The report was referred to an agency.
    Referred,
    /// The report was archived.
    Archived,
    /// The report was restored from the archive.
    Unarchived,
}

impl AuditAction {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged => "status_changed",
            Self::Assigned => "assigned",
            Self::Referred => "referred",
            Self::Archived => "archived",
            Self::Unarchived => "unarchived",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown audit action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audit action: {0}")]
pub struct ParseAuditActionError(pub String);

impl FromStr for AuditAction {
    type Err = ParseAuditActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "status_changed" => Ok(Self::StatusChanged),
            "assigned" => Ok(Self::Assigned),
            "referred" => Ok(Self::Referred),
            "archived" => Ok(Self::Archived),
            "unarchived" => Ok(Self::Unarchived),
            other => Err(ParseAuditActionError(other.to_owned())),
        }
    }
}

/// One row of a report's audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Primary key.
    pub id: AuditEntryId,
    /// Report the change applies to.
    pub report_id: ReportId,
    /// What kind of change happened.
    pub action: AuditAction,
    /// Status before the change; absent on creation.
    pub old_value: Option<ReportStatus>,
    /// Status after the change.
    pub new_value: ReportStatus,
    /// Account that made the change.
    pub acted_by: UserId,
    /// Free-text note supplied with the change.
    pub notes: Option<String>,
    /// When the change happened.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Record a change from `old_value` to `new_value`.
    #[must_use]
    pub fn record(
        report_id: ReportId,
        action: AuditAction,
        old_value: Option<ReportStatus>,
        new_value: ReportStatus,
        acted_by: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEntryId::random(),
            report_id,
            action,
            old_value,
            new_value,
            acted_by,
            notes,
            created_at: at,
        }
    }
}
