//! Clinic server entry-point: loads settings, prepares the store and serves
//! the HTTP API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic::inbound::http::health::HealthState;
use clinic::inbound::http::session_config::{BuildMode, session_settings_from_env};
use clinic::outbound::persistence::{DbPool, run_migrations};
use clinic::settings::ClinicSettings;

use server::{ServerConfig, Storage, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ClinicSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;

    let storage = match settings.pool_config() {
        Some(pool_config) => {
            run_migrations(pool_config.database_url())
                .await
                .map_err(io::Error::other)?;
            Storage::Postgres(DbPool::new(pool_config).await.map_err(io::Error::other)?)
        }
        None => Storage::Memory,
    };
    let config = ServerConfig::new(session, settings.bind_addr(), storage);

    let health_state = web::Data::new(HealthState::new());
    let outcome = create_server(health_state.clone(), config)?.await;
    health_state.mark_unhealthy();
    info!("clinic server stopped");
    outcome
}
