//! Shared helpers for the PostgreSQL integration suites.
//!
//! Each test gets a fresh database on the shared embedded cluster with the
//! portal migrations applied. Set `SKIP_TEST_CLUSTER=1` to skip the suites
//! where the cluster cannot start.

#![allow(dead_code, reason = "each suite uses a different subset")]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

use transport_portal::domain::ports::{BarangayRepository, UserRepository};
use transport_portal::domain::{Barangay, BarangayId, UserAccount, UserId, UserRole};
use transport_portal::outbound::persistence::{
    DbPool, DieselBarangayRepository, DieselUserRepository, MIGRATIONS, PoolConfig,
};

/// Returns true when `SKIP_TEST_CLUSTER` is set to a truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when allowed, otherwise fail loudly so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a `postgres` error with its SQLSTATE and message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => format!(
            "postgres error {:?}: {}",
            db_error.code(),
            db_error.message()
        ),
        None => error.to_string(),
    }
}

/// Fixed instant used as "now" by the suites.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// A migrated scratch database with a pool and one seeded barangay.
pub struct PortalDatabase {
    pub pool: DbPool,
    pub url: String,
    pub barangay: Barangay,
    pub runtime: Runtime,
    _database: TemporaryDatabase,
}

impl PortalDatabase {
    fn provision() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = shared_cluster_handle().map_err(|err| format!("{err:?}"))?;
        let database = cluster
            .temporary_database(format!("portal_test_{}", uuid::Uuid::new_v4().simple()))
            .map_err(|err| format!("create database: {err:?}"))?;
        let url = database.url().to_string();

        let mut conn = PgConnection::establish(&url).map_err(|err| format!("{err:?}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| format!("migration: {err:?}"))?;

        let config = PoolConfig::new(url.clone())
            .with_max_size(2)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        let barangay = Barangay::new(BarangayId::random(), "San Roque", "Marikina", fixture_now())
            .map_err(|err| err.to_string())?;
        runtime
            .block_on(DieselBarangayRepository::new(pool.clone()).insert(&barangay))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            pool,
            url,
            barangay,
            runtime,
            _database: database,
        })
    }

    /// Provision a database, or `None` when the cluster is unavailable and
    /// skipping is allowed.
    pub fn try_new() -> Option<Self> {
        match Self::provision() {
            Ok(db) => Some(db),
            Err(reason) => handle_cluster_setup_failure(reason),
        }
    }

    /// Insert a verified account in the seeded barangay.
    pub fn seed_user(&self, username: &str, role: UserRole, password_hash: &str) -> UserAccount {
        let account = UserAccount {
            id: UserId::random(),
            username: username.to_owned(),
            display_name: username.to_owned(),
            password_hash: password_hash.to_owned(),
            role,
            is_verified: true,
            barangay_id: self.barangay.id,
        };
        self.runtime
            .block_on(DieselUserRepository::new(self.pool.clone()).insert(&account))
            .expect("user inserted");
        account
    }

    /// Run raw SQL outside Diesel.
    pub fn execute(&self, sql: &str) -> Result<(), String> {
        let mut client =
            Client::connect(&self.url, NoTls).map_err(|err| format_postgres_error(&err))?;
        client
            .batch_execute(sql)
            .map_err(|err| format_postgres_error(&err))
    }

    /// Shared handle for building services over the pool.
    pub fn users(&self) -> Arc<DieselUserRepository> {
        Arc::new(DieselUserRepository::new(self.pool.clone()))
    }
}
