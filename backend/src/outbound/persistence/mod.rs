//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL through
//! `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain records; lifecycle rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and the table
//!   definitions (`schema.rs`) never leave this module.
//! - **Typed errors**: pool and Diesel failures map onto each port's error
//!   enum; raw database messages are only logged.
//!
//! # Example
//!
//! ```ignore
//! use transport_portal::outbound::persistence::{DbPool, DieselReportRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portal")).await?;
//! let reports = DieselReportRepository::new(pool);
//! ```

mod diesel_agency_repository;
mod diesel_barangay_repository;
mod diesel_helpers;
mod diesel_login_service;
mod diesel_report_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use diesel_agency_repository::DieselAgencyRepository;
pub use diesel_barangay_repository::DieselBarangayRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Versioned schema migrations from `backend/migrations`, applied by
/// `portal-admin migrate`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
