//! Typed report list filter.
//!
//! Every supported predicate is an explicit field. Persistence adapters
//! translate each one into a parameterised clause; nothing is concatenated
//! from user input.

use chrono::{DateTime, Utc};
use pagination::{Cursor, CursorError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Actor, BarangayId, UserId, UserRole};

use super::{ReportCategory, ReportStatus, Severity};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;
/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: usize = 100;
const SEARCH_MAX: usize = 100;

/// Keyset position over `(created_at DESC, id DESC)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCursor {
    /// Filing time of the last report on the previous page.
    pub created_at: DateTime<Utc>,
    /// Identifier of the last report on the previous page.
    pub id: Uuid,
}

impl ReportCursor {
    /// Encode as an opaque token.
    pub fn encode(&self) -> Result<String, CursorError> {
        Cursor::new(*self).encode()
    }

    /// Decode an opaque token.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        Cursor::<Self>::decode(token).map(Cursor::into_inner)
    }
}

/// Unvalidated filter values supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilterInput {
    /// Exact status match.
    pub status: Option<ReportStatus>,
    /// Exact severity match.
    pub severity: Option<Severity>,
    /// Exact category match.
    pub category: Option<ReportCategory>,
    /// Reports assigned to this account.
    pub assigned_to: Option<UserId>,
    /// Reports filed by this account.
    pub reported_by: Option<UserId>,
    /// Include archived reports; defaults to false.
    pub include_archived: Option<bool>,
    /// Case-insensitive substring over code, location and description.
    pub search: Option<String>,
    /// Inclusive lower bound on filing time.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on filing time.
    pub created_to: Option<DateTime<Utc>>,
    /// Requested page size.
    pub limit: Option<usize>,
    /// Opaque continuation token.
    pub cursor: Option<String>,
}

/// Reasons a filter cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportFilterError {
    /// Page size outside `1..=MAX_PAGE_LIMIT`.
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Largest accepted page size.
        max: usize,
    },
    /// The continuation token could not be decoded.
    #[error("cursor is not a valid continuation token")]
    InvalidCursor,
    /// `from` is after `to`.
    #[error("from must not be after to")]
    InvertedRange,
    /// Search text exceeds the accepted length.
    #[error("q must be at most {max} characters")]
    SearchTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl ReportFilterError {
    /// Query parameter the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidLimit { .. } => "limit",
            Self::InvalidCursor => "cursor",
            Self::InvertedRange => "from",
            Self::SearchTooLong { .. } => "q",
        }
    }
}

/// Validated filter scoped to one barangay.
///
/// # Examples
/// ```
/// use transport_portal::domain::{
///     Actor, BarangayId, ReportFilter, ReportFilterInput, ReportStatus, UserId, UserRole,
/// };
///
/// let actor = Actor::new(UserId::random(), UserRole::Employee, BarangayId::random());
/// let filter = ReportFilter::for_actor(
///     &actor,
///     ReportFilterInput {
///         status: Some(ReportStatus::Archived),
///         ..ReportFilterInput::default()
///     },
/// )
/// .expect("valid filter");
/// assert!(filter.include_archived);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    /// Barangay every result belongs to.
    pub barangay_id: BarangayId,
    /// Exact status match.
    pub status: Option<ReportStatus>,
    /// Exact severity match.
    pub severity: Option<Severity>,
    /// Exact category match.
    pub category: Option<ReportCategory>,
    /// Reports assigned to this account.
    pub assigned_to: Option<UserId>,
    /// Reports filed by this account.
    pub reported_by: Option<UserId>,
    /// Whether archived reports are returned.
    pub include_archived: bool,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
    /// Inclusive lower bound on filing time.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on filing time.
    pub created_to: Option<DateTime<Utc>>,
    /// Page size.
    pub limit: usize,
    /// Keyset position to continue after.
    pub after: Option<ReportCursor>,
}

impl ReportFilter {
    /// Validate `input` and scope it to what `actor` may see.
    ///
    /// Residents only ever see reports they filed, whatever `reported_by`
    /// they ask for. Asking for archived reports by status implies
    /// `include_archived`.
    pub fn for_actor(actor: &Actor, input: ReportFilterInput) -> Result<Self, ReportFilterError> {
        let limit = input.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ReportFilterError::InvalidLimit {
                max: MAX_PAGE_LIMIT,
            });
        }

        if let (Some(from), Some(to)) = (input.created_from, input.created_to) {
            if from > to {
                return Err(ReportFilterError::InvertedRange);
            }
        }

        let search = match input.search.as_deref().map(str::trim) {
            Some(text) if text.chars().count() > SEARCH_MAX => {
                return Err(ReportFilterError::SearchTooLong { max: SEARCH_MAX });
            }
            Some(text) if !text.is_empty() => Some(text.to_owned()),
            _ => None,
        };

        let after = input
            .cursor
            .as_deref()
            .map(ReportCursor::decode)
            .transpose()
            .map_err(|_| ReportFilterError::InvalidCursor)?;

        let reported_by = if actor.role() == UserRole::Resident {
            Some(actor.user_id())
        } else {
            input.reported_by
        };

        let include_archived = input.include_archived.unwrap_or(false)
            || input.status == Some(ReportStatus::Archived);

        Ok(Self {
            barangay_id: actor.barangay_id(),
            status: input.status,
            severity: input.severity,
            category: input.category,
            assigned_to: input.assigned_to,
            reported_by,
            include_archived,
            search,
            created_from: input.created_from,
            created_to: input.created_to,
            limit,
            after,
        })
    }
}
