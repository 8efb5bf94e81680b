//! Health check endpoints for both services

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use crate::database::health_check;
use crate::server::{AppState, StatsState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub issues: Vec<String>,
}

impl HealthResponse {
    fn new(database: bool, issues: Vec<String>) -> (StatusCode, Json<Self>) {
        let (code, status) = if database {
            (StatusCode::OK, "UP")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
        };

        (
            code,
            Json(Self {
                status,
                version: env!("CARGO_PKG_VERSION"),
                database,
                issues,
            }),
        )
    }
}

pub async fn main_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = state.services.health_check().await;
    HealthResponse::new(health.is_healthy(), health.get_issues())
}

pub async fn stats_health(State(state): State<StatsState>) -> (StatusCode, Json<HealthResponse>) {
    match health_check(&state.pool).await {
        Ok(()) => HealthResponse::new(true, Vec::new()),
        Err(e) => {
            tracing::warn!(error = %e, "Stats database health check failed");
            HealthResponse::new(false, vec!["Database connection failed".to_string()])
        }
    }
}
