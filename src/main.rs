//! EventHub main service
//!
//! Main application entry point

use std::net::SocketAddr;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use event_hub::{
    config::Settings,
    database::{create_pool, run_migrations},
    services::StatsClient,
    utils::logging,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging, "event-hub.log")?;

    info!("Starting {}...", event_hub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to the main database")?;

    // Run database migrations
    run_migrations(&pool).await.context("failed to run migrations")?;

    let stats_client = StatsClient::new(&settings.stats_client).context("failed to build stats client")?;
    info!(stats_url = %settings.stats_client.base_url, "Stats client configured");

    let app = event_hub::main_router(AppState::new(pool, stats_client));

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Main service listening on {}", address);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Main service has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
