//! EventHub stats service
//!
//! Records endpoint hits and serves aggregate view statistics

use std::net::SocketAddr;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use event_hub::{
    config::Settings,
    database::{create_pool, run_stats_migrations},
    utils::logging,
    StatsState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    let _log_guard = logging::init_logging(&settings.logging, "stats-server.log")?;

    info!("Starting stats service v{}...", event_hub::VERSION);

    let pool = create_pool(&settings.stats_database)
        .await
        .context("failed to connect to the stats database")?;
    run_stats_migrations(&pool).await.context("failed to run stats migrations")?;

    let app = event_hub::stats_router(StatsState::new(pool));

    let address = settings.stats_server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Stats service listening on {}", address);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
        .context("server error")?;

    info!("Stats service has been shut down.");
    Ok(())
}
