//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, reports,
//!   archives, agencies, dashboard, health)
//! - **Schemas**: the domain error payload and the report DTOs
//! - **Security**: session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::DashboardSnapshot;
use crate::domain::{
    Actor, AuditAction, Barangay, DashboardCounts, Error, ErrorCode, ReportCategory, ReportStatus,
    SafetyScore, Severity, UserRole,
};
use crate::inbound::http::agencies::{AgencyResponse, CreateAgencyRequest};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::reports::{
    ArchiveNoteRequest, ArchiveResponse, AssignmentRequest, AuditEntryResponse,
    CreateReportRequest, ReferralRequest, ReferralResponse, ReportPageResponse, ReportResponse,
    ScheduledDeletionsResponse, StatusChangeRequest,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Transport portal API",
        description = "Barangay traffic report intake, triage, referral and archiving."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::reports::submit_report,
        crate::inbound::http::reports::list_reports,
        crate::inbound::http::reports::get_report,
        crate::inbound::http::reports::change_status,
        crate::inbound::http::reports::assign_report,
        crate::inbound::http::reports::refer_report,
        crate::inbound::http::reports::archive_report,
        crate::inbound::http::reports::unarchive_report,
        crate::inbound::http::reports::report_history,
        crate::inbound::http::reports::scheduled_deletions,
        crate::inbound::http::agencies::list_agencies,
        crate::inbound::http::agencies::add_agency,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Actor,
        UserRole,
        LoginRequest,
        ReportStatus,
        ReportCategory,
        Severity,
        AuditAction,
        CreateReportRequest,
        StatusChangeRequest,
        AssignmentRequest,
        ReferralRequest,
        ArchiveNoteRequest,
        ReferralResponse,
        ArchiveResponse,
        ReportResponse,
        ReportPageResponse,
        AuditEntryResponse,
        ScheduledDeletionsResponse,
        CreateAgencyRequest,
        AgencyResponse,
        Barangay,
        DashboardCounts,
        SafetyScore,
        DashboardSnapshot,
    )),
    tags(
        (name = "auth", description = "Login and session"),
        (name = "reports", description = "Report intake and lifecycle"),
        (name = "archives", description = "Archiving and retention"),
        (name = "agencies", description = "Referral agencies"),
        (name = "dashboard", description = "Barangay statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI path and schema structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("ReportResponse", "isArchived")]
    #[case("ArchiveResponse", "scheduledDeletion")]
    #[case("ReportPageResponse", "nextCursor")]
    #[case("StatusChangeRequest", "expectedStatus")]
    fn schemas_use_camel_case_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/reports")]
    #[case("/api/v1/reports/{id}/status")]
    #[case("/api/v1/reports/{id}/archive")]
    #[case("/api/v1/archives/scheduled-deletions")]
    #[case("/api/v1/agencies")]
    #[case("/api/v1/dashboard")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn archive_path_documents_both_directions() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api/v1/reports/{id}/archive")
            .expect("archive path");
        assert!(item.post.is_some());
        assert!(item.delete.is_some());
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
