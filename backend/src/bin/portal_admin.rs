//! Deploy-time administration: schema migrations and account bootstrap.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use tokio::runtime::Builder;
use uuid::Uuid;
use zeroize::Zeroizing;

use transport_portal::domain::ports::{BarangayRepository, UserRepository};
use transport_portal::domain::{
    Barangay, BarangayId, LoginCredentials, UserAccount, UserId, UserRole,
};
use transport_portal::outbound::password::hash_password;
use transport_portal::outbound::persistence::{
    DbPool, DieselBarangayRepository, DieselUserRepository, MIGRATIONS, PoolConfig,
};

const DATABASE_URL_ENV: &str = "PORTAL_DATABASE_URL";
const NEW_USER_PASSWORD_ENV: &str = "PORTAL_NEW_USER_PASSWORD";

/// `portal-admin` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal-admin",
    about = "Migrate the portal database and bootstrap barangays and accounts",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `PORTAL_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Register a barangay and print its id.
    CreateBarangay {
        #[arg(long)]
        name: String,
        #[arg(long)]
        municipality: String,
    },
    /// Create an account; the password is read from `PORTAL_NEW_USER_PASSWORD`.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long = "display-name")]
        display_name: String,
        /// ADMIN, EMPLOYEE, TANOD or RESIDENT.
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
        #[arg(long = "barangay-id")]
        barangay_id: Uuid,
        /// Mark the account verified immediately.
        #[arg(long)]
        verified: bool,
    },
}

fn parse_role(raw: &str) -> Result<UserRole, String> {
    raw.parse::<UserRole>().map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create Tokio runtime")?;
    runtime.block_on(run(args.command, database_url))
}

async fn run(command: Command, database_url: String) -> Result<()> {
    match command {
        Command::Migrate => migrate(database_url).await,
        Command::CreateBarangay { name, municipality } => {
            let pool = connect(&database_url).await?;
            let barangay = Barangay::new(BarangayId::random(), &name, &municipality, Utc::now())
                .context("invalid barangay")?;
            DieselBarangayRepository::new(pool)
                .insert(&barangay)
                .await
                .context("store barangay")?;
            println!("{}", barangay.id);
            Ok(())
        }
        Command::CreateUser {
            username,
            display_name,
            role,
            barangay_id,
            verified,
        } => {
            let password = Zeroizing::new(
                env::var(NEW_USER_PASSWORD_ENV)
                    .map_err(|_| eyre!("{NEW_USER_PASSWORD_ENV} must be set"))?,
            );
            let credentials = LoginCredentials::try_from_parts(&username, &password)
                .context("invalid credentials")?;
            let display_name = display_name.trim();
            if display_name.is_empty() {
                return Err(eyre!("--display-name must not be empty"));
            }
            let account = UserAccount {
                id: UserId::random(),
                username: credentials.username().to_owned(),
                display_name: display_name.to_owned(),
                password_hash: hash_password(credentials.password()).context("hash password")?,
                role,
                is_verified: verified,
                barangay_id: BarangayId::from_uuid(barangay_id),
            };
            let pool = connect(&database_url).await?;
            DieselUserRepository::new(pool)
                .insert(&account)
                .await
                .context("store user")?;
            println!("{}", account.id);
            Ok(())
        }
    }
}

async fn connect(database_url: &str) -> Result<DbPool> {
    DbPool::new(
        PoolConfig::new(database_url)
            .with_max_size(1)
            .with_min_idle(None),
    )
    .await
    .context("create database pool")
}

async fn migrate(database_url: String) -> Result<()> {
    let applied = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
        let mut conn =
            PgConnection::establish(&database_url).context("connect for migrations")?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| eyre!("run migrations: {err}"))?;
        Ok(versions.iter().map(ToString::to_string).collect())
    })
    .await
    .context("migration task panicked")??;

    if applied.is_empty() {
        println!("schema up to date");
    }
    for version in applied {
        println!("applied {version}");
    }
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }
    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(eyre!("{DATABASE_URL_ENV} must not be empty")),
        None => Err(eyre!(
            "database URL missing: set --database-url or {DATABASE_URL_ENV}"
        )),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for argument parsing.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("postgres://cli"), Some("postgres://env"), "postgres://cli")]
    #[case(None, Some("postgres://env"), "postgres://env")]
    fn database_url_prefers_the_flag(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] expected: &str,
    ) {
        let url = resolve_database_url(explicit.map(str::to_owned), from_env.map(str::to_owned))
            .expect("url resolves");
        assert_eq!(url, expected);
    }

    #[rstest]
    #[case(Some(" "), None, "must not be empty when provided")]
    #[case(None, Some(""), "must not be empty")]
    #[case(None, None, "database URL missing")]
    fn database_url_errors_are_explicit(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] fragment: &str,
    ) {
        let err = resolve_database_url(explicit.map(str::to_owned), from_env.map(str::to_owned))
            .expect_err("url rejected");
        assert!(err.to_string().contains(fragment), "unexpected: {err}");
    }

    #[rstest]
    fn create_user_parses_role_and_barangay() {
        let barangay = Uuid::new_v4();
        let args = CliArgs::try_parse_from([
            "portal-admin",
            "create-user",
            "--username",
            "tanod.reyes",
            "--display-name",
            "Tanod Reyes",
            "--role",
            "tanod",
            "--barangay-id",
            &barangay.to_string(),
            "--verified",
        ])
        .expect("arguments parse");

        match args.command {
            Command::CreateUser {
                role,
                barangay_id,
                verified,
                ..
            } => {
                assert_eq!(role, UserRole::Tanod);
                assert_eq!(barangay_id, barangay);
                assert!(verified);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[rstest]
    fn unknown_roles_are_rejected() {
        let result = CliArgs::try_parse_from([
            "portal-admin",
            "create-user",
            "--username",
            "x",
            "--display-name",
            "X",
            "--role",
            "mayor",
            "--barangay-id",
            "6f1c2d7e-0000-4000-8000-000000000000",
        ]);
        assert!(result.is_err());
    }

    #[rstest]
    fn database_url_flag_is_global() {
        let args = CliArgs::try_parse_from(["portal-admin", "migrate", "--database-url", "postgres://x"])
            .expect("arguments parse");
        assert_eq!(args.database_url.as_deref(), Some("postgres://x"));
        assert!(matches!(args.command, Command::Migrate));
    }
}
