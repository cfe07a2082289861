//! Barangay dashboard handler.
//!
//! ```text
//! GET /api/v1/dashboard
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::ports::DashboardSnapshot;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Report counters and safety score for the caller's barangay.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardSnapshot),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Barangay personnel only", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard",
    security(("SessionCookie" = []))
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardSnapshot>> {
    let actor = current_actor(&state, &session).await?;
    state.dashboard.dashboard(&actor).await.map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportCategory, ReportDraft, Severity, UserRole};
    use crate::inbound::http::test_utils::{TestPortal, login_as};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    #[actix_web::test]
    async fn staff_see_counts_and_score() {
        let portal = TestPortal::new();
        let resident = portal.seed_user("juan", UserRole::Resident);
        portal.seed_user("admin", UserRole::Admin);
        for (category, severity) in [
            (ReportCategory::MinorAccident, Severity::High),
            (ReportCategory::RoadCondition, Severity::Low),
        ] {
            let draft = ReportDraft::new(category, severity, "Purok 2", "Fender bender")
                .expect("valid draft");
            portal
                .state
                .reports
                .submit_report(&resident.actor(), draft)
                .await
                .expect("report filed");
        }
        let app = actix_test::init_service(portal.app()).await;
        let admin = login_as(&app, "admin").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/dashboard")
                .cookie(admin)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["barangay"]["name"], "San Roque");
        assert_eq!(body["counts"]["total"], 2);
        assert_eq!(body["counts"]["pending"], 2);
        assert_eq!(body["counts"]["urgent"], 1);
        assert_eq!(body["counts"]["minorAccidents"], 1);
        assert_eq!(body["score"]["risk"], 9);
        assert_eq!(body["score"]["safety"], 91);
    }

    #[actix_web::test]
    async fn residents_are_forbidden() {
        let portal = TestPortal::new();
        portal.seed_user("juan", UserRole::Resident);
        let app = actix_test::init_service(portal.app()).await;
        let cookie = login_as(&app, "juan").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/dashboard")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
