//! Report status values and the transition table.
//!
//! The generic transition only follows [`ReportStatus::allowed_targets`].
//! `Referred` and `Archived` are reached through their dedicated operations,
//! each with its own source set, so they never appear as generic targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Newly filed, awaiting review.
    Pending,
    /// Picked up by staff for validation.
    UnderReview,
    /// Confirmed as a genuine report.
    Verified,
    /// Handed to a Tanod or employee.
    Assigned,
    /// Work has started.
    InProgress,
    /// Work is complete.
    Resolved,
    /// Forwarded to an external agency.
    Referred,
    /// Dismissed during review.
    Rejected,
    /// Sent back to the reporter for more detail.
    Returned,
    /// Retained but inactive, pending deletion.
    Archived,
}

impl ReportStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::UnderReview,
        Self::Verified,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
        Self::Referred,
        Self::Rejected,
        Self::Returned,
        Self::Archived,
    ];

    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Verified => "verified",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Referred => "referred",
            Self::Rejected => "rejected",
            Self::Returned => "returned",
            Self::Archived => "archived",
        }
    }

    /// Targets reachable through the generic transition operation.
    #[must_use]
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => &[
                Self::UnderReview,
                Self::Verified,
                Self::Rejected,
                Self::Returned,
            ],
            Self::UnderReview => &[Self::Verified, Self::Rejected, Self::Returned],
            Self::Returned => &[Self::Pending],
            Self::Verified => &[
                Self::Assigned,
                Self::InProgress,
                Self::Resolved,
                Self::Rejected,
            ],
            Self::Assigned => &[Self::InProgress],
            Self::InProgress => &[Self::Resolved],
            Self::Referred => &[Self::InProgress, Self::Resolved],
            Self::Resolved => &[Self::InProgress],
            Self::Rejected | Self::Archived => &[],
        }
    }

    /// Whether the generic transition may move from `self` to `target`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Whether a report in this status may be referred to an agency.
    #[must_use]
    pub const fn can_refer(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Verified | Self::Assigned | Self::InProgress
        )
    }

    /// Whether a report in this status may be archived.
    #[must_use]
    pub const fn can_archive(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Whether a report in this status may be (re)assigned.
    #[must_use]
    pub const fn can_assign(self) -> bool {
        matches!(self, Self::Verified | Self::Assigned)
    }

    /// Statuses counted as "pending" on dashboards.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending | Self::UnderReview)
    }

    /// Statuses where no further field work is expected.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected | Self::Archived)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report status: {0}")]
pub struct ParseReportStatusError(pub String);

impl FromStr for ReportStatus {
    type Err = ParseReportStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseReportStatusError(s.to_owned()))
    }
}
