//! Report lifecycle HTTP handlers.
//!
//! ```text
//! POST   /api/v1/reports
//! GET    /api/v1/reports?status=pending&q=pothole&limit=20
//! GET    /api/v1/reports/{id}
//! PATCH  /api/v1/reports/{id}/status {"status":"verified","expectedStatus":"under_review"}
//! POST   /api/v1/reports/{id}/assignment {"assigneeId":"..."}
//! POST   /api/v1/reports/{id}/referral {"agencyId":"...","reason":"..."}
//! POST   /api/v1/reports/{id}/archive
//! DELETE /api/v1/reports/{id}/archive
//! GET    /api/v1/reports/{id}/history
//! GET    /api/v1/archives/scheduled-deletions?withinDays=30
//! ```
//!
//! Handlers only translate between JSON and the domain ports. Role checks,
//! the transition table and audit writes happen in the lifecycle service.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde_json::json;

use crate::domain::ports::{ArchiveRequest, AssignRequest, ReferRequest, TransitionRequest};
use crate::domain::{Error, ReportId, ReportStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_enum, parse_id, parse_optional_enum, require,
};

#[path = "reports_dto.rs"]
mod dto;

pub use dto::{
    ArchiveNoteRequest, ArchiveResponse, AssignmentRequest, AuditEntryResponse,
    CreateReportRequest, ReferralRequest, ReferralResponse, ReportListQuery, ReportPageResponse,
    ReportResponse, ScheduledDeletionsQuery, ScheduledDeletionsResponse, StatusChangeRequest,
};
use dto::{ReportPath, STATUS_VALUES, parse_create_request, parse_list_query};

fn parse_report_id(path: ReportPath) -> Result<ReportId, Error> {
    parse_id(&path.id, FieldName::new("id"))
}

fn parse_status_request(
    report_id: ReportId,
    payload: StatusChangeRequest,
) -> Result<TransitionRequest, Error> {
    let field = FieldName::new("status");
    let target: ReportStatus =
        parse_enum(&require(payload.status, field)?, field, STATUS_VALUES)?;
    let expected_status = parse_optional_enum(
        payload.expected_status,
        FieldName::new("expectedStatus"),
        STATUS_VALUES,
    )?;
    Ok(TransitionRequest {
        report_id,
        target,
        expected_status,
        notes: payload.notes,
    })
}

fn parse_assignment_request(
    report_id: ReportId,
    payload: AssignmentRequest,
) -> Result<AssignRequest, Error> {
    let field = FieldName::new("assigneeId");
    Ok(AssignRequest {
        report_id,
        assignee: parse_id(&require(payload.assignee_id, field)?, field)?,
        notes: payload.notes,
    })
}

fn parse_referral_request(
    report_id: ReportId,
    payload: ReferralRequest,
) -> Result<ReferRequest, Error> {
    let field = FieldName::new("agencyId");
    Ok(ReferRequest {
        report_id,
        agency_id: parse_id(&require(payload.agency_id, field)?, field)?,
        reason: require(payload.reason, FieldName::new("reason"))?,
        notes: payload.notes,
    })
}

/// Archive bodies are optional, but a body that is present must parse.
fn archive_request(report_id: ReportId, body: &[u8]) -> Result<ArchiveRequest, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ArchiveRequest {
            report_id,
            notes: None,
        });
    }
    let payload: ArchiveNoteRequest = serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request("malformed request body").with_details(json!({
            "code": "invalid_json",
            "reason": err.to_string(),
        }))
    })?;
    Ok(ArchiveRequest {
        report_id,
        notes: payload.notes,
    })
}

/// File a new report.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report filed", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Unverified resident", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "submitReport",
    security(("SessionCookie" = []))
)]
#[post("/reports")]
pub async fn submit_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReportRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let draft = parse_create_request(payload.into_inner())?;
    let report = state.reports.submit_report(&actor, draft).await?;
    Ok(HttpResponse::Created().json(ReportResponse::from(report)))
}

/// List reports in the caller's barangay.
///
/// Residents only ever see their own reports.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Page of reports, newest first", body = ReportPageResponse),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listReports",
    security(("SessionCookie" = []))
)]
#[get("/reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportListQuery>,
) -> ApiResult<web::Json<ReportPageResponse>> {
    let actor = current_actor(&state, &session).await?;
    let filter = parse_list_query(query.into_inner())?;
    let page = state.reports_query.list_reports(&actor, filter).await?;
    Ok(web::Json(ReportPageResponse::from(page)))
}

/// Fetch one report.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Report", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reports"],
    operation_id = "getReport",
    security(("SessionCookie" = []))
)]
#[get("/reports/{id}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let report_id = parse_report_id(path.into_inner())?;
    let report = state.reports_query.report(&actor, &report_id).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Move a report along the transition table.
#[utoipa::path(
    patch,
    path = "/api/v1/reports/{id}/status",
    request_body = StatusChangeRequest,
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Updated report", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error),
        (status = 422, description = "Transition not allowed", body = Error)
    ),
    tags = ["reports"],
    operation_id = "changeReportStatus",
    security(("SessionCookie" = []))
)]
#[patch("/reports/{id}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let report_id = parse_report_id(path.into_inner())?;
    let request = parse_status_request(report_id, payload.into_inner())?;
    let report = state.reports.transition(&actor, request).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Assign a verified report to a Tanod or Employee.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/assignment",
    request_body = AssignmentRequest,
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Assigned report", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error),
        (status = 422, description = "Report cannot be assigned", body = Error)
    ),
    tags = ["reports"],
    operation_id = "assignReport",
    security(("SessionCookie" = []))
)]
#[post("/reports/{id}/assignment")]
pub async fn assign_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
    payload: web::Json<AssignmentRequest>,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let report_id = parse_report_id(path.into_inner())?;
    let request = parse_assignment_request(report_id, payload.into_inner())?;
    let report = state.reports.assign(&actor, request).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Refer a report to an external agency.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/referral",
    request_body = ReferralRequest,
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Referred report", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Report or agency not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error),
        (status = 422, description = "Report cannot be referred", body = Error)
    ),
    tags = ["reports"],
    operation_id = "referReport",
    security(("SessionCookie" = []))
)]
#[post("/reports/{id}/referral")]
pub async fn refer_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
    payload: web::Json<ReferralRequest>,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let report_id = parse_report_id(path.into_inner())?;
    let request = parse_referral_request(report_id, payload.into_inner())?;
    let report = state.reports.refer(&actor, request).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Archive a resolved or rejected report.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/archive",
    request_body = ArchiveNoteRequest,
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Archived report", body = ReportResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error),
        (status = 422, description = "Report cannot be archived", body = Error)
    ),
    tags = ["archives"],
    operation_id = "archiveReport",
    security(("SessionCookie" = []))
)]
#[post("/reports/{id}/archive")]
pub async fn archive_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let request = archive_request(parse_report_id(path.into_inner())?, &body)?;
    let report = state.reports.archive(&actor, request).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Restore an archived report to the status it was archived from.
#[utoipa::path(
    delete,
    path = "/api/v1/reports/{id}/archive",
    request_body = ArchiveNoteRequest,
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Restored report", body = ReportResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error),
        (status = 422, description = "Report is not archived", body = Error)
    ),
    tags = ["archives"],
    operation_id = "unarchiveReport",
    security(("SessionCookie" = []))
)]
#[delete("/reports/{id}/archive")]
pub async fn unarchive_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<ReportResponse>> {
    let actor = current_actor(&state, &session).await?;
    let request = archive_request(parse_report_id(path.into_inner())?, &body)?;
    let report = state.reports.unarchive(&actor, request).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Audit trail of one report, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/history",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Audit entries", body = [AuditEntryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reports"],
    operation_id = "reportHistory",
    security(("SessionCookie" = []))
)]
#[get("/reports/{id}/history")]
pub async fn report_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ReportPath>,
) -> ApiResult<web::Json<Vec<AuditEntryResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let report_id = parse_report_id(path.into_inner())?;
    let entries = state.reports_query.history(&actor, &report_id).await?;
    Ok(web::Json(
        entries.into_iter().map(AuditEntryResponse::from).collect(),
    ))
}

/// Archived reports whose retention ends within the look-ahead.
#[utoipa::path(
    get,
    path = "/api/v1/archives/scheduled-deletions",
    params(ScheduledDeletionsQuery),
    responses(
        (status = 200, description = "Reports due for deletion", body = ScheduledDeletionsResponse),
        (status = 400, description = "Invalid window", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrators only", body = Error)
    ),
    tags = ["archives"],
    operation_id = "scheduledDeletions",
    security(("SessionCookie" = []))
)]
#[get("/archives/scheduled-deletions")]
pub async fn scheduled_deletions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ScheduledDeletionsQuery>,
) -> ApiResult<web::Json<ScheduledDeletionsResponse>> {
    let actor = current_actor(&state, &session).await?;
    let schedule = state
        .reports_query
        .scheduled_deletions(&actor, query.into_inner().within_days)
        .await?;
    Ok(web::Json(ScheduledDeletionsResponse::from(schedule)))
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
