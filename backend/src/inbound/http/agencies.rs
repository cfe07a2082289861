//! Referral agency handlers.
//!
//! ```text
//! GET  /api/v1/agencies
//! POST /api/v1/agencies {"name":"City Traffic Office","agencyType":"traffic office",...}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Agency, AgencyDraft, AgencyFields, AgencyValidationError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, require};

/// Request payload for registering an agency.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgencyRequest {
    pub name: Option<String>,
    #[schema(example = "police")]
    pub agency_type: Option<String>,
    pub contact_person: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    /// Promised response time, 1 to 720 hours.
    pub response_time_hours: Option<u32>,
}

/// Agency as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgencyResponse {
    pub id: String,
    pub name: String,
    pub agency_type: String,
    pub contact_person: String,
    pub contact_number: String,
    pub email: Option<String>,
    pub response_time_hours: u32,
    pub created_at: String,
}

impl From<Agency> for AgencyResponse {
    fn from(agency: Agency) -> Self {
        Self {
            id: agency.id.to_string(),
            name: agency.name,
            agency_type: agency.agency_type,
            contact_person: agency.contact_person,
            contact_number: agency.contact_number,
            email: agency.email,
            response_time_hours: agency.response_time_hours,
            created_at: agency.created_at.to_rfc3339(),
        }
    }
}

fn map_agency_validation_error(err: AgencyValidationError) -> Error {
    field_error(FieldName::new(err.field()), err.to_string())
}

fn parse_create_request(payload: CreateAgencyRequest) -> Result<AgencyDraft, Error> {
    let name = require(payload.name, FieldName::new("name"))?;
    let agency_type = require(payload.agency_type, FieldName::new("agencyType"))?;
    let contact_person = require(payload.contact_person, FieldName::new("contactPerson"))?;
    let contact_number = require(payload.contact_number, FieldName::new("contactNumber"))?;
    let response_time_hours = require(
        payload.response_time_hours,
        FieldName::new("responseTimeHours"),
    )?;
    AgencyDraft::new(AgencyFields {
        name: &name,
        agency_type: &agency_type,
        contact_person: &contact_person,
        contact_number: &contact_number,
        email: payload.email.as_deref(),
        response_time_hours,
    })
    .map_err(map_agency_validation_error)
}

/// List referral agencies by name.
#[utoipa::path(
    get,
    path = "/api/v1/agencies",
    responses(
        (status = 200, description = "Agencies", body = [AgencyResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff only", body = Error)
    ),
    tags = ["agencies"],
    operation_id = "listAgencies",
    security(("SessionCookie" = []))
)]
#[get("/agencies")]
pub async fn list_agencies(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AgencyResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let agencies = state.agencies.list_agencies(&actor).await?;
    Ok(web::Json(
        agencies.into_iter().map(AgencyResponse::from).collect(),
    ))
}

/// Register a referral agency.
#[utoipa::path(
    post,
    path = "/api/v1/agencies",
    request_body = CreateAgencyRequest,
    responses(
        (status = 201, description = "Agency registered", body = AgencyResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrators only", body = Error),
        (status = 409, description = "Duplicate name", body = Error)
    ),
    tags = ["agencies"],
    operation_id = "addAgency",
    security(("SessionCookie" = []))
)]
#[post("/agencies")]
pub async fn add_agency(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAgencyRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let draft = parse_create_request(payload.into_inner())?;
    let agency = state.agencies.add_agency(&actor, draft).await?;
    Ok(HttpResponse::Created().json(AgencyResponse::from(agency)))
}
