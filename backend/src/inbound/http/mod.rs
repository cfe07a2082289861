//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every route below is mounted under `/api/v1` behind the session
//! middleware; see [`configure_api`].

pub mod agencies;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod reports;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api/v1` handlers on a scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use transport_portal::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(reports::submit_report)
        .service(reports::list_reports)
        .service(reports::scheduled_deletions)
        .service(reports::get_report)
        .service(reports::change_status)
        .service(reports::assign_report)
        .service(reports::refer_report)
        .service(reports::archive_report)
        .service(reports::unarchive_report)
        .service(reports::report_history)
        .service(agencies::list_agencies)
        .service(agencies::add_agency)
        .service(dashboard::dashboard);
}
