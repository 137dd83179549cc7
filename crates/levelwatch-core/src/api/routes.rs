//! API routes

use axum::{routing::get, routing::post, Router};

use super::handlers::{self, AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))

        // Level ingestion
        .route(
            "/api",
            post(handlers::ingest_level).fallback(handlers::method_not_allowed),
        )

        // Level queries
        .route(
            "/api/level",
            get(handlers::latest_level).fallback(handlers::method_not_allowed),
        )
        .route("/api/levels", get(handlers::list_levels))

        .with_state(state)
}
