//! Login, logout and session actor handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"kagawad.cruz","password":"..."}
//! POST /api/v1/logout
//! GET /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::{Actor, Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
///
/// Example JSON:
/// `{"username":"kagawad.cruz","password":"s3cret"}`
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
        LoginValidationError::PasswordTooLong { .. } => ("password", "password_too_long"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Resolve the session into a live actor.
///
/// The cookie only proves who logged in; role, verification and barangay are
/// re-read on every request. A session for a deleted account is purged.
pub(crate) async fn current_actor(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Actor, Error> {
    let user_id = session.require_user_id()?;
    match state.actors.resolve(&user_id).await? {
        Some(actor) => Ok(actor),
        None => {
            warn!(user_id = %user_id, "session refers to a missing account");
            session.purge();
            Err(Error::unauthorized("login required"))
        }
    }
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Actor, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let actor = state.login.authenticate(&credentials).await?;
    session.persist_actor(&actor)?;
    info!(user_id = %actor.user_id(), role = actor.role().as_str(), "login");
    Ok(HttpResponse::Ok().json(actor))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Current session actor.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Session actor", body = Actor),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentActor",
    security(("SessionCookie" = []))
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Actor>> {
    current_actor(&state, &session).await.map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::inbound::http::test_utils::{TestPortal, login_as, session_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case("   ", "pw", "username", "empty_username")]
    #[case("kagawad", "", "password", "empty_password")]
    #[actix_web::test]
    async fn login_validates_the_payload(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let portal = TestPortal::new();
        let app = actix_test::init_service(portal.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": username, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let portal = TestPortal::new();
        portal.seed_user("kagawad", UserRole::Employee);
        let app = actix_test::init_service(portal.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "kagawad", "password": "guess" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "invalid credentials");
    }

    #[actix_web::test]
    async fn me_returns_the_logged_in_actor() {
        let portal = TestPortal::new();
        let account = portal.seed_user("tanod.reyes", UserRole::Tanod);
        let app = actix_test::init_service(portal.app()).await;
        let cookie = login_as(&app, "tanod.reyes").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["userId"], account.id.to_string());
        assert_eq!(body["role"], "TANOD");
        assert_eq!(body["barangayId"], portal.barangay.id.to_string());
    }

    #[actix_web::test]
    async fn me_without_session_is_unauthorised() {
        let portal = TestPortal::new();
        let app = actix_test::init_service(portal.app()).await;
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/v1/me").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_clears_the_cookie() {
        let portal = TestPortal::new();
        portal.seed_user("admin", UserRole::Admin);
        let app = actix_test::init_service(portal.app()).await;
        let cookie = login_as(&app, "admin").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(session_cookie(&res).value(), "");
    }

    #[actix_web::test]
    async fn role_changes_apply_to_existing_sessions() {
        let portal = TestPortal::new();
        let mut account = portal.seed_user("clerk", UserRole::Employee);
        let app = actix_test::init_service(portal.app()).await;
        let cookie = login_as(&app, "clerk").await;

        account.role = UserRole::Resident;
        portal.store.seed_user(account);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["role"], "RESIDENT");
    }

    #[actix_web::test]
    async fn unknown_session_user_is_unauthorised() {
        let mut actors = crate::domain::ports::MockActorDirectory::new();
        actors.expect_resolve().returning(|_| Ok(None));
        let mut portal = TestPortal::new();
        portal.state.actors = std::sync::Arc::new(actors);
        portal.seed_user("ghost", UserRole::Employee);
        let app = actix_test::init_service(portal.app()).await;
        let cookie = login_as(&app, "ghost").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(session_cookie(&res).value(), "");
    }
}
