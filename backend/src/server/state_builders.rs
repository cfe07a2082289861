//! Builders wiring the PostgreSQL adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use transport_portal::domain::{
    AgencyService, DashboardService, DeletionWindow, LinearRiskScoring, ReportLifecycleService,
    RetentionPolicy, UserActorDirectory,
};
use transport_portal::inbound::http::state::HttpState;
use transport_portal::outbound::persistence::{
    DbPool, DieselAgencyRepository, DieselBarangayRepository, DieselLoginService,
    DieselReportRepository, DieselUserRepository,
};

/// Policies applied by the lifecycle service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecyclePolicies {
    pub retention: RetentionPolicy,
    pub deletion_window: DeletionWindow,
}

/// Build the shared HTTP state from a database pool.
pub fn build_http_state(pool: &DbPool, policies: LifecyclePolicies) -> web::Data<HttpState> {
    let reports = Arc::new(DieselReportRepository::new(pool.clone()));
    let agencies = Arc::new(DieselAgencyRepository::new(pool.clone()));
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let barangays = Arc::new(DieselBarangayRepository::new(pool.clone()));

    let lifecycle = Arc::new(
        ReportLifecycleService::new(
            reports.clone(),
            agencies.clone(),
            users.clone(),
            Arc::new(DefaultClock),
        )
        .with_retention(policies.retention)
        .with_deletion_window(policies.deletion_window),
    );

    web::Data::new(HttpState {
        login: Arc::new(DieselLoginService::new(DieselUserRepository::new(
            pool.clone(),
        ))),
        actors: Arc::new(UserActorDirectory::new(users)),
        reports: lifecycle.clone(),
        reports_query: lifecycle,
        agencies: Arc::new(AgencyService::new(agencies)),
        dashboard: Arc::new(DashboardService::new(
            reports,
            barangays,
            Arc::new(LinearRiskScoring),
        )),
    })
}
