//! API handlers for the HTTP REST API

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alerting::ThresholdAlerter;
use crate::db::ReadingStore;
use crate::models::{IngestResponse, LevelInput, Reading};

use super::error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Reading store
    pub store: ReadingStore,
    /// Background threshold alerting
    pub alerter: Arc<ThresholdAlerter>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Whether the store answered `SELECT 1`
    pub db_healthy: bool,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.store.health_check().await.is_ok();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db_healthy,
    })
}

/// Store a reading, then check the threshold in the background.
///
/// The body is parsed by hand so clients that omit `Content-Type` keep
/// working, and so every parse failure is a plain 400.
pub async fn ingest_level(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let input: LevelInput =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;

    let reading = state.store.append(input.level).await.map_err(ApiError::Save)?;
    debug!(reading_id = reading.id, level = reading.level, "Reading saved");

    // Detached: the client never waits on alert delivery.
    state.alerter.spawn_check(reading.level);

    Ok(Json(IngestResponse::saved(reading.level)))
}

/// Latest stored level as a bare JSON number
pub async fn latest_level(State(state): State<AppState>) -> Result<Json<f64>, ApiError> {
    let level = state.store.latest().await.map_err(ApiError::Load)?;
    Ok(Json(level))
}

/// Query parameters for the reading history
#[derive(Debug, Deserialize)]
pub struct ListLevelsQuery {
    /// Maximum number of readings, default 100
    pub limit: Option<i64>,
}

/// Newest-first reading history
pub async fn list_levels(
    State(state): State<AppState>,
    Query(query): Query<ListLevelsQuery>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let readings = state
        .store
        .recent(query.limit.unwrap_or(100))
        .await
        .map_err(ApiError::Load)?;
    Ok(Json(readings))
}

/// Fallback for known paths hit with the wrong method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
