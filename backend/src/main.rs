//! Recipes server entry point.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipes::config::AppSettings;
use recipes::inbound::http::health::HealthState;
use recipes::inbound::http::session_config::{BuildMode, session_settings_from_env};
use recipes::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn connect_store(settings: &AppSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url() else {
        return Ok(None);
    };
    let applied = run_pending_migrations(url)
        .await
        .map_err(|e| std::io::Error::other(format!("database migrations failed: {e}")))?;
    info!(applied, "database schema up to date");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("invalid configuration: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(format!("session configuration: {e}")))?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_vote_retry_attempts(settings.vote_retry_attempts());
    if let Some(pool) = connect_store(&settings).await? {
        config = config.with_db_pool(pool);
    }
    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::make_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting recipes server");
    create_server(health_state, config)?.await
}
