//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain records
//! return `Result<_, String>` so repositories can fold them into their own
//! query errors with `collect_rows`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{barangays, referral_agencies, report_audit_log, reports, users};
use crate::domain::{
    Agency, AgencyId, ArchiveRecord, AuditEntry, AuditEntryId, Barangay, BarangayId,
    ReferralSnapshot, Report, ReportCode, ReportId, ReportStatus, UserAccount, UserId,
};

// ---------------------------------------------------------------------------
// Barangays
// ---------------------------------------------------------------------------

/// Row struct for reading from the barangays table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = barangays)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BarangayRow {
    pub id: Uuid,
    pub name: String,
    pub municipality: String,
    pub created_at: DateTime<Utc>,
}

impl From<BarangayRow> for Barangay {
    fn from(row: BarangayRow) -> Self {
        Self {
            id: BarangayId::from_uuid(row.id),
            name: row.name,
            municipality: row.municipality,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for new barangays.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = barangays)]
pub(crate) struct NewBarangayRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub municipality: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Barangay> for NewBarangayRow<'a> {
    fn from(barangay: &'a Barangay) -> Self {
        Self {
            id: *barangay.id.as_uuid(),
            name: &barangay.name,
            municipality: &barangay.municipality,
            created_at: barangay.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub barangay_id: Uuid,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(|err| format!("users.role: {err}"))?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: row.username,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role,
            is_verified: row.is_verified,
            barangay_id: BarangayId::from_uuid(row.barangay_id),
        })
    }
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
    pub role: &'static str,
    pub is_verified: bool,
    pub barangay_id: Uuid,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.id.as_uuid(),
            username: &account.username,
            display_name: &account.display_name,
            password_hash: &account.password_hash,
            role: account.role.as_str(),
            is_verified: account.is_verified,
            barangay_id: *account.barangay_id.as_uuid(),
        }
    }
}

// ---------------------------------------------------------------------------
// Referral agencies
// ---------------------------------------------------------------------------

/// Row struct for reading from the referral_agencies table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = referral_agencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AgencyRow {
    pub id: Uuid,
    pub name: String,
    pub agency_type: String,
    pub contact_person: String,
    pub contact_number: String,
    pub email: Option<String>,
    pub response_time_hours: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AgencyRow> for Agency {
    type Error = String;

    fn try_from(row: AgencyRow) -> Result<Self, Self::Error> {
        let response_time_hours = u32::try_from(row.response_time_hours)
            .map_err(|_| format!("negative response time for agency {}", row.id))?;
        Ok(Self {
            id: AgencyId::from_uuid(row.id),
            name: row.name,
            agency_type: row.agency_type,
            contact_person: row.contact_person,
            contact_number: row.contact_number,
            email: row.email,
            response_time_hours,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for new agencies.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = referral_agencies)]
pub(crate) struct NewAgencyRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub agency_type: &'a str,
    pub contact_person: &'a str,
    pub contact_number: &'a str,
    pub email: Option<&'a str>,
    pub response_time_hours: i32,
    pub created_at: DateTime<Utc>,
}

impl<'a> TryFrom<&'a Agency> for NewAgencyRow<'a> {
    type Error = String;

    fn try_from(agency: &'a Agency) -> Result<Self, Self::Error> {
        let response_time_hours = i32::try_from(agency.response_time_hours)
            .map_err(|_| format!("response time out of range: {}", agency.response_time_hours))?;
        Ok(Self {
            id: *agency.id.as_uuid(),
            name: &agency.name,
            agency_type: &agency.agency_type,
            contact_person: &agency.contact_person,
            contact_number: &agency.contact_number,
            email: agency.email.as_deref(),
            response_time_hours,
            created_at: agency.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Row struct for reading from the reports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub code: String,
    pub barangay_id: Uuid,
    pub category: String,
    pub severity: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub reported_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub referred_agency_id: Option<Uuid>,
    pub referred_agency_name: Option<String>,
    pub referral_contact: Option<String>,
    pub referral_reason: Option<String>,
    pub referred_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_from: Option<String>,
    pub scheduled_deletion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_status(column: &str, value: &str) -> Result<ReportStatus, String> {
    value.parse().map_err(|err| format!("{column}: {err}"))
}

impl ReportRow {
    fn referral(&self) -> Option<ReferralSnapshot> {
        Some(ReferralSnapshot {
            agency_id: AgencyId::from_uuid(self.referred_agency_id?),
            agency_name: self.referred_agency_name.clone()?,
            contact: self.referral_contact.clone()?,
            reason: self.referral_reason.clone()?,
            referred_at: self.referred_at?,
        })
    }

    fn archive(&self) -> Result<Option<ArchiveRecord>, String> {
        if !self.is_archived {
            return Ok(None);
        }
        match (self.archived_at, self.archived_from.as_deref(), self.scheduled_deletion) {
            (Some(archived_at), Some(from), Some(scheduled_deletion)) => Ok(Some(ArchiveRecord {
                archived_at,
                archived_from: parse_status("reports.archived_from", from)?,
                scheduled_deletion,
            })),
            _ => Err(format!("report {} is archived without metadata", self.id)),
        }
    }
}

impl TryFrom<ReportRow> for Report {
    type Error = String;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let archive = row.archive()?;
        let referral = row.referral();
        Ok(Self {
            id: ReportId::from_uuid(row.id),
            code: ReportCode::from_stored(row.code),
            barangay_id: BarangayId::from_uuid(row.barangay_id),
            category: row
                .category
                .parse()
                .map_err(|err| format!("reports.category: {err}"))?,
            severity: row
                .severity
                .parse()
                .map_err(|err| format!("reports.severity: {err}"))?,
            location: row.location,
            description: row.description,
            status: parse_status("reports.status", &row.status)?,
            reported_by: UserId::from_uuid(row.reported_by),
            assigned_to: row.assigned_to.map(UserId::from_uuid),
            referral,
            resolution_notes: row.resolution_notes,
            archive,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Full-row struct used both to insert a report and to overwrite its mutable
/// columns on a guarded update.
///
/// `treat_none_as_null` makes clearing a field (for example resolution notes
/// on reopen, or archive columns on unarchive) write `NULL`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = reports)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReportRecord<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub barangay_id: Uuid,
    pub category: &'static str,
    pub severity: &'static str,
    pub location: &'a str,
    pub description: &'a str,
    pub status: &'static str,
    pub reported_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub referred_agency_id: Option<Uuid>,
    pub referred_agency_name: Option<&'a str>,
    pub referral_contact: Option<&'a str>,
    pub referral_reason: Option<&'a str>,
    pub referred_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<&'a str>,
    pub is_archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub archived_from: Option<&'static str>,
    pub scheduled_deletion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Report> for ReportRecord<'a> {
    fn from(report: &'a Report) -> Self {
        let referral = report.referral.as_ref();
        Self {
            id: *report.id.as_uuid(),
            code: report.code.as_str(),
            barangay_id: *report.barangay_id.as_uuid(),
            category: report.category.as_str(),
            severity: report.severity.as_str(),
            location: &report.location,
            description: &report.description,
            status: report.status.as_str(),
            reported_by: *report.reported_by.as_uuid(),
            assigned_to: report.assigned_to.map(|user| *user.as_uuid()),
            referred_agency_id: referral.map(|r| *r.agency_id.as_uuid()),
            referred_agency_name: referral.map(|r| r.agency_name.as_str()),
            referral_contact: referral.map(|r| r.contact.as_str()),
            referral_reason: referral.map(|r| r.reason.as_str()),
            referred_at: referral.map(|r| r.referred_at),
            resolution_notes: report.resolution_notes.as_deref(),
            is_archived: report.is_archived(),
            archived_at: report.archive.map(|a| a.archived_at),
            archived_from: report.archive.map(|a| a.archived_from.as_str()),
            scheduled_deletion: report.archive.map(|a| a.scheduled_deletion),
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

/// Row struct for reading from the report_audit_log table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = report_audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditRow {
    pub id: Uuid,
    pub report_id: Uuid,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub acted_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = String;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuditEntryId::from_uuid(row.id),
            report_id: ReportId::from_uuid(row.report_id),
            action: row
                .action
                .parse()
                .map_err(|err| format!("report_audit_log.action: {err}"))?,
            old_value: row
                .old_value
                .as_deref()
                .map(|value| parse_status("report_audit_log.old_value", value))
                .transpose()?,
            new_value: parse_status("report_audit_log.new_value", &row.new_value)?,
            acted_by: UserId::from_uuid(row.acted_by),
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for audit rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = report_audit_log)]
pub(crate) struct NewAuditRow<'a> {
    pub id: Uuid,
    pub report_id: Uuid,
    pub action: &'static str,
    pub old_value: Option<&'static str>,
    pub new_value: &'static str,
    pub acted_by: Uuid,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a AuditEntry> for NewAuditRow<'a> {
    fn from(entry: &'a AuditEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            report_id: *entry.report_id.as_uuid(),
            action: entry.action.as_str(),
            old_value: entry.old_value.map(ReportStatus::as_str),
            new_value: entry.new_value.as_str(),
            acted_by: *entry.acted_by.as_uuid(),
            notes: entry.notes.as_deref(),
            created_at: entry.created_at,
        }
    }
}
