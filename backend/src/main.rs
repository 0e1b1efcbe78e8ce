//! Blogstore entry-point: loads settings, builds the store pool, and serves
//! health probes.

mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blogstore::inbound::http::health::HealthState;
use blogstore::outbound::persistence::{DbPool, PoolConfig};
use server::{AppSettings, ServerConfig, create_server};

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let database_url = settings
        .database_url()
        .ok_or_else(|| std::io::Error::other("BLOGSTORE_DATABASE_URL must be set"))?;
    let bind_addr: SocketAddr = settings.bind_addr().parse().map_err(|e| {
        std::io::Error::other(format!("invalid bind address {}: {e}", settings.bind_addr()))
    })?;

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr).with_db_pool(pool);
    let server = create_server(health_state, config, Arc::new(DefaultClock))?;
    info!(%bind_addr, "blogstore listening");
    server.await
}
