//! Backend entry-point: loads settings, applies migrations and serves the
//! REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use social::inbound::http::health::HealthState;
use social::outbound::persistence::{DbPool, run_pending_migrations};

use server::{AppSettings, create_server};

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

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = settings
        .into_runtime()
        .map_err(|e| std::io::Error::other(format!("invalid settings: {e}")))?;

    let database_url = config.pool.database_url().to_owned();
    tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let pool = DbPool::new(config.pool.clone())
        .await
        .map_err(|e| std::io::Error::other(format!("failed to build database pool: {e}")))?;
    info!("database pool ready");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &pool, &config)?;
    server.await
}
