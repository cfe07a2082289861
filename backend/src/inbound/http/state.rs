//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ActorDirectory, AgencyRegistry, DashboardQuery, LoginService, ReportCommand, ReportQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use transport_portal::domain::{
///     AgencyService, DashboardService, LinearRiskScoring, ReportLifecycleService,
///     UserActorDirectory,
/// };
/// use transport_portal::inbound::http::state::HttpState;
/// use transport_portal::outbound::persistence::{
///     DbPool, DieselAgencyRepository, DieselBarangayRepository, DieselLoginService,
///     DieselReportRepository, DieselUserRepository,
/// };
///
/// fn state(pool: DbPool) -> HttpState {
///     let reports = Arc::new(DieselReportRepository::new(pool.clone()));
///     let agencies = Arc::new(DieselAgencyRepository::new(pool.clone()));
///     let users = Arc::new(DieselUserRepository::new(pool.clone()));
///     let barangays = Arc::new(DieselBarangayRepository::new(pool.clone()));
///     let lifecycle = Arc::new(ReportLifecycleService::new(
///         reports.clone(),
///         agencies.clone(),
///         users.clone(),
///         Arc::new(DefaultClock),
///     ));
///     HttpState {
///         login: Arc::new(DieselLoginService::new(DieselUserRepository::new(pool))),
///         actors: Arc::new(UserActorDirectory::new(users)),
///         reports: lifecycle.clone(),
///         reports_query: lifecycle,
///         agencies: Arc::new(AgencyService::new(agencies)),
///         dashboard: Arc::new(DashboardService::new(
///             reports,
///             barangays,
///             Arc::new(LinearRiskScoring),
///         )),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    /// Credential check for `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// Re-reads the session actor on each request.
    pub actors: Arc<dyn ActorDirectory>,
    /// Report lifecycle mutations.
    pub reports: Arc<dyn ReportCommand>,
    /// Report reads.
    pub reports_query: Arc<dyn ReportQuery>,
    /// Referral agencies.
    pub agencies: Arc<dyn AgencyRegistry>,
    /// Barangay dashboard.
    pub dashboard: Arc<dyn DashboardQuery>,
}
