//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters. Driving
//! ports (`ReportCommand`, `ReportQuery`, `AgencyRegistry`, `DashboardQuery`,
//! `LoginService`, `ActorDirectory`) are implemented by domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod agency_registry;
mod agency_repository;
mod barangay_repository;
mod dashboard_query;
mod login_service;
mod report_command;
mod report_query;
mod report_repository;
mod user_repository;

pub use agency_registry::AgencyRegistry;
#[cfg(test)]
pub use agency_repository::MockAgencyRepository;
pub use agency_repository::{AgencyRepository, AgencyRepositoryError};
#[cfg(test)]
pub use barangay_repository::MockBarangayRepository;
pub use barangay_repository::{BarangayRepository, BarangayRepositoryError};
pub use dashboard_query::{DashboardQuery, DashboardSnapshot};
#[cfg(test)]
pub use login_service::{MockActorDirectory, MockLoginService};
pub use login_service::{ActorDirectory, LoginService};
pub use report_command::{
    ArchiveRequest, AssignRequest, ReferRequest, ReportCommand, TransitionRequest,
};
pub use report_query::{DeletionSchedule, ReportQuery};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportChange, ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
