//! Stats service handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crate::handlers::extract::{QueryParams, ValidJson};
use crate::models::hit::{EndpointHit, ViewStats};
use crate::server::StatsState;
use crate::utils::errors::Result;

pub async fn record_hit(
    State(state): State<StatsState>,
    ValidJson(hit): ValidJson<EndpointHit>,
) -> Result<(StatusCode, Json<EndpointHit>)> {
    let saved = state.stats.record(hit).await?;
    Ok((
        StatusCode::CREATED,
        Json(EndpointHit {
            app: saved.app,
            uri: saved.uri,
            ip: saved.ip,
            timestamp: saved.timestamp,
        }),
    ))
}

pub async fn get_stats(State(state): State<StatsState>, params: QueryParams) -> Result<Json<Vec<ViewStats>>> {
    let start = params.timestamp("start")?;
    let end = params.timestamp("end")?;
    let uris: Vec<String> = params.list("uris")?;
    let unique = params.value("unique")?.unwrap_or(false);

    let stats = state.stats.stats(start, end, uris, unique).await?;
    Ok(Json(stats))
}
