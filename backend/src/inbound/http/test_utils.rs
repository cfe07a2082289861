//! Test helpers for inbound HTTP components.
//!
//! [`TestPortal`] wires the real domain services over the in-memory store so
//! handler tests exercise authorisation and the transition table end to end
//! without a database.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::{
    Actor, AgencyService, Barangay, BarangayId, DashboardService, Error, LinearRiskScoring,
    LoginCredentials, ReportLifecycleService, UserAccount, UserActorDirectory, UserId, UserRole,
};
use crate::inbound::http::state::HttpState;
use crate::test_support::{FixtureClock, InMemoryReportStore};

/// Password accepted by [`StoreLogin`] for every seeded account.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set on a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Login stub that skips password hashing.
pub struct StoreLogin(Arc<InMemoryReportStore>);

#[async_trait]
impl LoginService for StoreLogin {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        let account = UserRepository::find_by_username(self.0.as_ref(), credentials.username())
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))?;
        match account {
            Some(account) if credentials.password() == TEST_PASSWORD => Ok(account.actor()),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

/// In-memory portal with one barangay.
pub struct TestPortal {
    pub store: Arc<InMemoryReportStore>,
    pub clock: Arc<FixtureClock>,
    pub barangay: Barangay,
    pub state: HttpState,
}

impl TestPortal {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryReportStore::new());
        let clock = Arc::new(FixtureClock::new(
            Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
                .single()
                .expect("valid fixture time"),
        ));
        let barangay = Barangay::new(BarangayId::random(), "San Roque", "Marikina", clock_now(&clock))
            .expect("valid barangay");
        store.seed_barangay(barangay.clone());

        let lifecycle = Arc::new(ReportLifecycleService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let state = HttpState {
            login: Arc::new(StoreLogin(store.clone())),
            actors: Arc::new(UserActorDirectory::new(store.clone())),
            reports: lifecycle.clone(),
            reports_query: lifecycle,
            agencies: Arc::new(AgencyService::new(store.clone())),
            dashboard: Arc::new(DashboardService::new(
                store.clone(),
                store.clone(),
                Arc::new(LinearRiskScoring),
            )),
        };

        Self {
            store,
            clock,
            barangay,
            state,
        }
    }

    /// Seed a verified account in the portal's barangay.
    pub fn seed_user(&self, username: &str, role: UserRole) -> UserAccount {
        let account = UserAccount {
            id: UserId::random(),
            username: username.to_owned(),
            display_name: username.to_owned(),
            password_hash: String::new(),
            role,
            is_verified: true,
            barangay_id: self.barangay.id,
        };
        self.store.seed_user(account.clone());
        account
    }

    /// App serving the whole `/api/v1` surface.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(crate::inbound::http::configure_api),
            )
    }
}

fn clock_now(clock: &FixtureClock) -> chrono::DateTime<Utc> {
    mockable::Clock::utc(clock)
}

/// Log in through `POST /api/v1/login` and return the session cookie.
pub async fn login_as<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(serde_json::json!({ "username": username, "password": TEST_PASSWORD }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "login failed for {username}");
    session_cookie(&response)
}
