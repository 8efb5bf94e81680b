//! Database connection management

use sqlx::{Pool, Postgres};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use crate::config::DatabaseConfig;
use crate::utils::errors::EventHubError;

pub type DatabasePool = Pool<Postgres>;

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(Duration::from_secs(600)))
        .max_lifetime(Some(Duration::from_secs(1800)))
}

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, EventHubError> {
    let pool = pool_options(config).connect(&config.url).await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Create a pool that connects on first use
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<DatabasePool, EventHubError> {
    Ok(pool_options(config).connect_lazy(&config.url)?)
}

/// Run the main service migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), EventHubError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations/main")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Run the stats service migrations
pub async fn run_stats_migrations(pool: &DatabasePool) -> Result<(), EventHubError> {
    tracing::info!("Running stats database migrations...");

    sqlx::migrate!("./migrations/stats")
        .run(pool)
        .await?;

    tracing::info!("Stats database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), EventHubError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let mut config = Settings::default().database;
        config.min_connections = 0;
        let pool = create_lazy_pool(&config).unwrap();
        assert!(!pool.is_closed());
    }

    #[tokio::test]
    async fn test_lazy_pool_rejects_malformed_url() {
        let mut config = Settings::default().database;
        config.url = "not-a-url".to_string();
        assert!(create_lazy_pool(&config).is_err());
    }
}
