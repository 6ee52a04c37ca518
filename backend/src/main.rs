//! Backend entry-point: resolves configuration, checks the database, and
//! serves the REST API.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use plateworks_backend::inbound::http::HealthState;
use plateworks_backend::outbound::persistence::{DbPool, PoolConfig};
use plateworks_backend::server::{AppConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("pool setup failed: {e}")))?;

    // The startup database ping happens inside create_server; readiness
    // stays withheld until it passes.
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config, pool).await?;
    info!("server started");

    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
