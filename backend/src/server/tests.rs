//! Tests for server assembly: readiness signalling, cookie policy and the
//! middleware stack around the API scope.

use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::Value;

use transport_portal::domain::ports::LoginService;
use transport_portal::domain::{
    Actor, AgencyService, Barangay, BarangayId, DashboardService, Error, LinearRiskScoring,
    LoginCredentials, ReportLifecycleService, TRACE_ID_HEADER, UserAccount, UserActorDirectory,
    UserId, UserRole,
};
use transport_portal::inbound::http::health::HealthState;
use transport_portal::inbound::http::session_config::SessionSettings;
use transport_portal::inbound::http::state::HttpState;
use transport_portal::test_support::{FixtureClock, InMemoryReportStore};

use super::{AppDependencies, ServerConfig, build_app, create_server};

/// Accepts one account regardless of the password supplied.
struct SingleAccountLogin(UserAccount);

#[async_trait]
impl LoginService for SingleAccountLogin {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        if credentials.username() == self.0.username {
            Ok(self.0.actor())
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn http_state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryReportStore::new());
    let now = Utc
        .with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
        .single()
        .expect("valid fixture time");
    let clock = Arc::new(FixtureClock::new(now));
    let barangay = Barangay::new(BarangayId::random(), "Malanday", "Valenzuela", now)
        .expect("valid barangay");
    let account = UserAccount {
        id: UserId::random(),
        username: "kapitan".to_owned(),
        display_name: "Kapitan".to_owned(),
        password_hash: String::new(),
        role: UserRole::Admin,
        is_verified: true,
        barangay_id: barangay.id,
    };
    store.seed_barangay(barangay);
    store.seed_user(account.clone());

    let lifecycle = Arc::new(ReportLifecycleService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        clock,
    ));
    web::Data::new(HttpState {
        login: Arc::new(SingleAccountLogin(account)),
        actors: Arc::new(UserActorDirectory::new(store.clone())),
        reports: lifecycle.clone(),
        reports_query: lifecycle,
        agencies: Arc::new(AgencyService::new(store.clone())),
        dashboard: Arc::new(DashboardService::new(
            store.clone(),
            store,
            Arc::new(LinearRiskScoring),
        )),
    })
}

fn deps(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> AppDependencies {
    AppDependencies {
        health_state,
        http_state,
        session: lax_session(),
    }
}

fn lax_session() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

#[fixture]
fn server_config() -> ServerConfig {
    ServerConfig::new(
        lax_session(),
        "127.0.0.1:0".parse().expect("loopback address"),
    )
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    server_config: ServerConfig,
) {
    assert!(!health_state.is_ready(), "state should start unready");
    assert_eq!(server_config.bind_addr.port(), 0);

    let _server = create_server(health_state.clone(), http_state, server_config)
        .expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
#[actix_rt::test]
async fn readiness_probe_follows_health_state(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) {
    let app = test::init_service(build_app(deps(health_state.clone(), http_state))).await;

    let before = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);

    health_state.mark_ready();
    let after = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::OK);
    assert!(after.headers().contains_key(TRACE_ID_HEADER));
}

#[rstest]
#[actix_rt::test]
async fn api_errors_carry_the_trace_header(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) {
    let app = test::init_service(build_app(deps(health_state, http_state))).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/me").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["traceId"].as_str(), Some(header.as_str()));
}

#[rstest]
#[actix_rt::test]
async fn session_cookie_follows_the_configured_policy(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) {
    let app = test::init_service(build_app(deps(health_state, http_state))).await;

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({"username": "kapitan", "password": "anything"}))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = login
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(
        cookie.max_age(),
        Some(actix_web::cookie::time::Duration::hours(2))
    );

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = test::read_body_json(me).await;
    assert_eq!(body["role"], "ADMIN");
}

#[cfg(debug_assertions)]
#[rstest]
#[actix_rt::test]
async fn debug_builds_serve_the_openapi_document(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) {
    let app = test::init_service(build_app(deps(health_state, http_state))).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["info"]["title"], "Transport portal API");
}
