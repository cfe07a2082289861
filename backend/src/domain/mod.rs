//! Domain model and services.
//!
//! Purpose: hold the report lifecycle, its state machine and the supporting
//! records without depending on Actix or Diesel. Inbound adapters call the
//! driving ports in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic error payload and its codes.
//! - `Report`, `ReportStatus`, `AuditEntry`, `ReportFilter`: the lifecycle.
//! - `Agency`, `Barangay`, `UserAccount`, `Actor`: supporting records.
//! - `RetentionPolicy`, `DashboardCounts`, `SafetyScoring`: policies.
//! - `ReportLifecycleService`, `AgencyService`, `DashboardService`,
//!   `UserActorDirectory`: services implementing the driving ports.

mod actor_directory_service;
mod agency;
mod agency_service;
mod auth;
mod barangay;
mod dashboard_service;
pub mod error;
mod ids;
pub mod ports;
mod report;
mod report_lifecycle_service;
mod retention;
mod statistics;
pub mod trace_id;
mod user;

pub use self::actor_directory_service::UserActorDirectory;
pub use self::agency::{Agency, AgencyDraft, AgencyFields, AgencyValidationError};
pub use self::agency_service::AgencyService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::barangay::{Barangay, BarangayValidationError};
pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{AgencyId, AuditEntryId, BarangayId, ReportId, UserId};
pub use self::report::{
    ArchiveRecord, AuditAction, AuditEntry, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
    ParseAuditActionError, ParseReportCategoryError, ParseReportStatusError, ParseSeverityError,
    ReferralSnapshot, Report, ReportCategory, ReportCode, ReportCursor, ReportDraft, ReportFilter,
    ReportFilterError, ReportFilterInput, ReportStatus, ReportValidationError, Severity,
};
pub use self::report_lifecycle_service::ReportLifecycleService;
pub use self::retention::{
    DEFAULT_DELETION_WINDOW_DAYS, DEFAULT_RETENTION_YEARS, DeletionWindow, RetentionError,
    RetentionPolicy,
};
pub use self::statistics::{DashboardCounts, LinearRiskScoring, SafetyScore, SafetyScoring};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Actor, ParseUserRoleError, UserAccount, UserRole};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use transport_portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
