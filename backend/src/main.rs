//! Portal entry-point: loads settings, wires the PostgreSQL adapters and
//! serves the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{LifecyclePolicies, ServerConfig, build_http_state, create_server};
use transport_portal::inbound::http::health::HealthState;
use transport_portal::inbound::http::session_config::fingerprint::key_fingerprint;
use transport_portal::inbound::http::session_config::{BuildMode, session_settings};
use transport_portal::outbound::persistence::{DbPool, PoolConfig};
use transport_portal::settings::{PortalSettings, ServerSettings};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let settings = ServerSettings::try_from(settings).map_err(std::io::Error::other)?;

    let session = session_settings(&settings.session, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.clone()).with_max_size(settings.db_max_connections),
    )
    .await
    .map_err(|e| std::io::Error::other(format!("failed to connect to database: {e}")))?;

    let http_state = build_http_state(
        &pool,
        LifecyclePolicies {
            retention: settings.retention,
            deletion_window: settings.deletion_window,
        },
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::new(session, settings.bind_addr),
    )?;
    info!(
        bind_addr = %settings.bind_addr,
        retention_years = settings.retention.years(),
        "portal listening"
    );

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
