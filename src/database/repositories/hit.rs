//! Hit repository implementation for the stats service

use sqlx::{PgPool, Postgres, QueryBuilder};
use crate::models::hit::{EndpointHit, Hit, StatsQuery, ViewStats};
use crate::utils::errors::EventHubError;

#[derive(Clone, Debug)]
pub struct HitRepository {
    pool: PgPool,
}

impl HitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one hit
    pub async fn record(&self, hit: &EndpointHit) -> Result<Hit, EventHubError> {
        let hit = sqlx::query_as::<_, Hit>(
            r#"
            INSERT INTO hits (app, uri, ip, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id, app, uri, ip, timestamp
            "#
        )
        .bind(&hit.app)
        .bind(&hit.uri)
        .bind(&hit.ip)
        .bind(hit.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EventHubError::Persistence(format!("Failed to save hit: {}", e)))?;

        Ok(hit)
    }

    /// Aggregate hits per (app, uri), busiest first
    pub async fn stats(&self, query: &StatsQuery) -> Result<Vec<ViewStats>, EventHubError> {
        let counter = if query.unique { "COUNT(DISTINCT ip)" } else { "COUNT(ip)" };

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT app, uri, {} AS hits FROM hits", counter));
        builder
            .push(" WHERE timestamp BETWEEN ")
            .push_bind(query.start)
            .push(" AND ")
            .push_bind(query.end);
        if !query.uris.is_empty() {
            builder.push(" AND uri = ANY(").push_bind(query.uris.clone()).push(")");
        }
        builder.push(" GROUP BY app, uri ORDER BY hits DESC, uri ASC");

        let stats = builder
            .build_query_as::<ViewStats>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EventHubError::Persistence(format!("Failed to load stats: {}", e)))?;

        Ok(stats)
    }
}
