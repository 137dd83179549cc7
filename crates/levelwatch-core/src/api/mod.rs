//! REST API implementation
//!
//! This module provides the HTTP API for Levelwatch.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::alerting::ThresholdAlerter;
use crate::db::ReadingStore;
use crate::error::Result;

/// HTTP API server
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(store: ReadingStore, alerter: Arc<ThresholdAlerter>) -> Self {
        Self {
            state: AppState { store, alerter },
        }
    }

    /// Router with the production middleware stack
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Serve on `addr` until `shutdown` resolves
    pub async fn serve<F>(self, addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", listener.local_addr()?);
        info!("POST endpoint available at: http://{}/api", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

/// Build the full application: routes plus tracing and CORS layers
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
