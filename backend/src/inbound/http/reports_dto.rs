//! Report DTOs and parsing helpers.

use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::DeletionSchedule;
use crate::domain::{
    AuditAction, AuditEntry, Error, Report, ReportCategory, ReportDraft, ReportFilterInput,
    ReportStatus, ReportValidationError, Severity,
};
use crate::inbound::http::validation::{
    FieldName, field_error, parse_enum, parse_optional_enum, parse_optional_id,
    parse_optional_rfc3339_timestamp, require,
};

pub(super) const STATUS_VALUES: &str = "pending, under_review, verified, assigned, in_progress, \
     resolved, referred, rejected, returned, archived";
pub(super) const SEVERITY_VALUES: &str = "low, medium, high, critical";
pub(super) const CATEGORY_VALUES: &str = "road_condition, traffic_incident, minor_accident, \
     major_accident, illegal_parking, other";

/// `{id}` path segment.
#[derive(Debug, Deserialize)]
pub struct ReportPath {
    pub id: String,
}

/// Request payload for filing a report.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[schema(example = "road_condition")]
    pub category: Option<String>,
    #[schema(example = "high")]
    pub severity: Option<String>,
    #[schema(max_length = 255)]
    pub location: Option<String>,
    #[schema(max_length = 4000)]
    pub description: Option<String>,
}

/// Request payload for a generic status change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub status: Option<String>,
    /// Status the caller last saw; a mismatch yields `409`.
    pub expected_status: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for assigning a report.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub assignee_id: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for referring a report.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    pub agency_id: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Optional note attached to archive and unarchive.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveNoteRequest {
    pub notes: Option<String>,
}

/// Query string for `GET /api/v1/reports`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Exact status; `archived` implies `includeArchived`.
    pub status: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub reported_by: Option<String>,
    pub include_archived: Option<bool>,
    /// Case-insensitive substring of code, location or description.
    pub q: Option<String>,
    /// Inclusive lower `createdAt` bound (RFC 3339).
    pub from: Option<String>,
    /// Inclusive upper `createdAt` bound (RFC 3339).
    pub to: Option<String>,
    /// Page size, 1 to 100.
    pub limit: Option<usize>,
    /// Opaque continuation token from `nextCursor`.
    pub cursor: Option<String>,
}

/// Query string for the scheduled-deletion report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduledDeletionsQuery {
    /// Look-ahead in days; defaults to the configured window.
    pub within_days: Option<u32>,
}

/// Referral snapshot as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralResponse {
    pub agency_id: String,
    pub agency_name: String,
    pub contact: String,
    pub reason: String,
    pub referred_at: String,
}

/// Archive metadata as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub archived_at: String,
    pub archived_from: ReportStatus,
    pub scheduled_deletion: String,
}

/// Response payload for a report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    #[schema(example = "RPT-20260314-3FA85F")]
    pub code: String,
    pub barangay_id: String,
    pub category: ReportCategory,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub status: ReportStatus,
    pub reported_by: String,
    pub assigned_to: Option<String>,
    pub referral: Option<ReferralResponse>,
    pub resolution_notes: Option<String>,
    pub archive: Option<ArchiveResponse>,
    pub is_archived: bool,
    pub is_urgent: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        let is_archived = report.is_archived();
        let is_urgent = report.is_urgent();
        Self {
            id: report.id.to_string(),
            code: report.code.as_str().to_owned(),
            barangay_id: report.barangay_id.to_string(),
            category: report.category,
            severity: report.severity,
            location: report.location,
            description: report.description,
            status: report.status,
            reported_by: report.reported_by.to_string(),
            assigned_to: report.assigned_to.map(|id| id.to_string()),
            referral: report.referral.map(|referral| ReferralResponse {
                agency_id: referral.agency_id.to_string(),
                agency_name: referral.agency_name,
                contact: referral.contact,
                reason: referral.reason,
                referred_at: referral.referred_at.to_rfc3339(),
            }),
            resolution_notes: report.resolution_notes,
            archive: report.archive.map(|archive| ArchiveResponse {
                archived_at: archive.archived_at.to_rfc3339(),
                archived_from: archive.archived_from,
                scheduled_deletion: archive.scheduled_deletion.to_rfc3339(),
            }),
            is_archived,
            is_urgent,
            created_at: report.created_at.to_rfc3339(),
            updated_at: report.updated_at.to_rfc3339(),
        }
    }
}

/// One page of reports.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPageResponse {
    pub items: Vec<ReportResponse>,
    /// Pass as `cursor` to fetch the next page; absent on the last page.
    pub next_cursor: Option<String>,
    pub limit: usize,
}

impl From<Page<Report>> for ReportPageResponse {
    fn from(page: Page<Report>) -> Self {
        Self {
            items: page.items.into_iter().map(ReportResponse::from).collect(),
            next_cursor: page.next_cursor,
            limit: page.limit,
        }
    }
}

/// One audit row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: String,
    pub report_id: String,
    pub action: AuditAction,
    pub old_value: Option<ReportStatus>,
    pub new_value: ReportStatus,
    pub acted_by: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            report_id: entry.report_id.to_string(),
            action: entry.action,
            old_value: entry.old_value,
            new_value: entry.new_value,
            acted_by: entry.acted_by.to_string(),
            notes: entry.notes,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Archived reports approaching their deletion date.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDeletionsResponse {
    pub within_days: u32,
    pub due_before: String,
    pub reports: Vec<ReportResponse>,
}

impl From<DeletionSchedule> for ScheduledDeletionsResponse {
    fn from(schedule: DeletionSchedule) -> Self {
        Self {
            within_days: schedule.within_days,
            due_before: schedule.due_before.to_rfc3339(),
            reports: schedule
                .reports
                .into_iter()
                .map(ReportResponse::from)
                .collect(),
        }
    }
}

fn map_draft_error(err: ReportValidationError) -> Error {
    field_error(FieldName::new(err.field()), err.to_string())
}

pub(super) fn parse_create_request(payload: CreateReportRequest) -> Result<ReportDraft, Error> {
    let category_field = FieldName::new("category");
    let severity_field = FieldName::new("severity");
    let category: ReportCategory = parse_enum(
        &require(payload.category, category_field)?,
        category_field,
        CATEGORY_VALUES,
    )?;
    let severity: Severity = parse_enum(
        &require(payload.severity, severity_field)?,
        severity_field,
        SEVERITY_VALUES,
    )?;
    let location = require(payload.location, FieldName::new("location"))?;
    let description = require(payload.description, FieldName::new("description"))?;
    ReportDraft::new(category, severity, &location, &description).map_err(map_draft_error)
}

pub(super) fn parse_list_query(query: ReportListQuery) -> Result<ReportFilterInput, Error> {
    Ok(ReportFilterInput {
        status: parse_optional_enum(query.status, FieldName::new("status"), STATUS_VALUES)?,
        severity: parse_optional_enum(query.severity, FieldName::new("severity"), SEVERITY_VALUES)?,
        category: parse_optional_enum(query.category, FieldName::new("category"), CATEGORY_VALUES)?,
        assigned_to: parse_optional_id(query.assigned_to, FieldName::new("assignedTo"))?,
        reported_by: parse_optional_id(query.reported_by, FieldName::new("reportedBy"))?,
        include_archived: query.include_archived,
        search: query.q,
        created_from: parse_optional_rfc3339_timestamp(query.from, FieldName::new("from"))?,
        created_to: parse_optional_rfc3339_timestamp(query.to, FieldName::new("to"))?,
        limit: query.limit,
        cursor: query.cursor,
    })
}
