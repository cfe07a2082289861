//! Traffic and road-condition reports.
//!
//! A [`Report`] is filed from a validated [`ReportDraft`] and then moves
//! through the [`ReportStatus`] state machine. Each change is described by an
//! [`AuditEntry`] persisted alongside the new report state.

mod audit;
mod filter;
mod status;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AgencyId, BarangayId, ReportId, UserId};

pub use self::audit::{AuditAction, AuditEntry, ParseAuditActionError};
pub use self::filter::{
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, ReportCursor, ReportFilter, ReportFilterError,
    ReportFilterInput,
};
pub use self::status::{ParseReportStatusError, ReportStatus};

const LOCATION_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 4000;

/// Kind of incident or condition being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Potholes, flooding, damaged signage.
    RoadCondition,
    /// Congestion, obstruction or signal failure.
    TrafficIncident,
    /// Collision without serious injury.
    MinorAccident,
    /// Collision with serious injury or major damage.
    MajorAccident,
    /// Vehicles obstructing roads or sidewalks.
    IllegalParking,
    /// Anything else.
    Other,
}

/// Reported urgency of an incident.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic or informational.
    Low,
    /// Needs attention within days.
    Medium,
    /// Needs attention today.
    High,
    /// Immediate danger.
    Critical,
}

impl Severity {
    /// High and critical reports are urgent while still open.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

macro_rules! storage_names {
    ($ty:ident, $err:ident, $label:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Stable storage and wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        #[doc = concat!("Raised when parsing an unknown ", $label, " string.")]
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        #[error("unknown {}: {}", $label, .0)]
        pub struct $err(pub String);

        impl FromStr for $ty {
            type Err = $err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err($err(other.to_owned())),
                }
            }
        }
    };
}

storage_names!(ReportCategory, ParseReportCategoryError, "report category", {
    RoadCondition => "road_condition",
    TrafficIncident => "traffic_incident",
    MinorAccident => "minor_accident",
    MajorAccident => "major_accident",
    IllegalParking => "illegal_parking",
    Other => "other",
});

storage_names!(Severity, ParseSeverityError, "severity", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Validation failures for report drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    /// Location was blank.
    #[error("location must not be empty")]
    EmptyLocation,
    /// Location exceeded the column width.
    #[error("location must be at most {max} characters")]
    LocationTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description was blank.
    #[error("description must not be empty")]
    EmptyDescription,
    /// Description exceeded the accepted length.
    #[error("description must be at most {max} characters")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl ReportValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyLocation | Self::LocationTooLong { .. } => "location",
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => "description",
        }
    }
}

/// Validated input for filing a report.
///
/// ## Invariants
/// - `location` is trimmed, non-empty and at most 255 characters.
/// - `description` is trimmed, non-empty and at most 4000 characters.
///
/// # Examples
/// ```
/// use transport_portal::domain::{ReportCategory, ReportDraft, Severity};
///
/// let draft = ReportDraft::new(
///     ReportCategory::RoadCondition,
///     Severity::High,
///     "  Rizal Ave corner Mabini St ",
///     "Deep pothole in the northbound lane",
/// )
/// .expect("valid draft");
/// assert_eq!(draft.location(), "Rizal Ave corner Mabini St");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    category: ReportCategory,
    severity: Severity,
    location: String,
    description: String,
}

impl ReportDraft {
    /// Validate raw draft fields.
    pub fn new(
        category: ReportCategory,
        severity: Severity,
        location: &str,
        description: &str,
    ) -> Result<Self, ReportValidationError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ReportValidationError::EmptyLocation);
        }
        if location.chars().count() > LOCATION_MAX {
            return Err(ReportValidationError::LocationTooLong { max: LOCATION_MAX });
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ReportValidationError::EmptyDescription);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ReportValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            category,
            severity,
            location: location.to_owned(),
            description: description.to_owned(),
        })
    }

    /// Report category.
    #[must_use]
    pub const fn category(&self) -> ReportCategory {
        self.category
    }

    /// Reported severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Trimmed location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Trimmed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Human-facing report code in the form `RPT-YYYYMMDD-XXXXXX`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use transport_portal::domain::{ReportCode, ReportId};
/// use uuid::Uuid;
///
/// let id = ReportId::from_uuid(Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap());
/// let at = Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();
/// assert_eq!(ReportCode::generate(id, at).as_str(), "RPT-20260314-A1B2C3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportCode(String);

impl ReportCode {
    /// Derive the code from the report id and filing time.
    #[must_use]
    pub fn generate(id: ReportId, filed_at: DateTime<Utc>) -> Self {
        let suffix: String = id
            .as_uuid()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect();
        Self(format!(
            "RPT-{}-{}",
            filed_at.format("%Y%m%d"),
            suffix.to_ascii_uppercase()
        ))
    }

    /// Rehydrate a stored code.
    #[must_use]
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Borrow the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Agency details copied onto a report when it is referred.
///
/// The copy keeps the referral readable even if the agency record changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralSnapshot {
    /// Referenced agency.
    pub agency_id: AgencyId,
    /// Agency name at referral time.
    pub agency_name: String,
    /// Contact person and number at referral time.
    pub contact: String,
    /// Why the report was referred.
    pub reason: String,
    /// When the referral happened.
    pub referred_at: DateTime<Utc>,
}

/// Archive bookkeeping for an archived report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRecord {
    /// When the report was archived.
    pub archived_at: DateTime<Utc>,
    /// Status restored by unarchiving.
    pub archived_from: ReportStatus,
    /// Retention deadline.
    pub scheduled_deletion: DateTime<Utc>,
}

/// A report and its lifecycle state.
///
/// ## Invariants
/// - `archive.is_some()` exactly when `status == Archived`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Primary key.
    pub id: ReportId,
    /// Human-facing code.
    pub code: ReportCode,
    /// Owning barangay.
    pub barangay_id: BarangayId,
    /// Category.
    pub category: ReportCategory,
    /// Severity.
    pub severity: Severity,
    /// Where it happened.
    pub location: String,
    /// What happened.
    pub description: String,
    /// Current lifecycle status.
    pub status: ReportStatus,
    /// Account that filed the report.
    pub reported_by: UserId,
    /// Account currently working the report.
    pub assigned_to: Option<UserId>,
    /// Most recent referral, kept after the report moves on.
    pub referral: Option<ReferralSnapshot>,
    /// Notes captured on resolution.
    pub resolution_notes: Option<String>,
    /// Archive bookkeeping while archived.
    pub archive: Option<ArchiveRecord>,
    /// Filing time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// File a new pending report.
    #[must_use]
    pub fn file(
        id: ReportId,
        draft: ReportDraft,
        reported_by: UserId,
        barangay_id: BarangayId,
        now: DateTime<Utc>,
    ) -> Self {
        let ReportDraft {
            category,
            severity,
            location,
            description,
        } = draft;
        Self {
            id,
            code: ReportCode::generate(id, now),
            barangay_id,
            category,
            severity,
            location,
            description,
            status: ReportStatus::Pending,
            reported_by,
            assigned_to: None,
            referral: None,
            resolution_notes: None,
            archive: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the report is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archive.is_some()
    }

    /// Open, high-severity reports.
    #[must_use]
    pub const fn is_urgent(&self) -> bool {
        self.severity.is_urgent() && !self.status.is_closed()
    }
}
