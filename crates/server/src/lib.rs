//! HTTP surface for the office question-answering pipeline.
//!
//! - `POST /query` answers a question
//! - `GET /stats` reports the indexed collection
//! - `GET /health` is a liveness probe

use axum::{
    routing::{get, post},
    Router,
};
use office_rag_core::{AppConfig, AppError, AppResult};
use routes::{health::health, query::query, stats::stats};
use tower_http::trace::TraceLayer;

pub mod api_state;
pub mod error;
pub mod routes;

pub use api_state::ApiState;
pub use error::ApiError;

/// Router with every endpoint bound to `state`.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Build the pipeline from `config` and serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    let state = ApiState::from_config(config)?;
    let address = format!("{}:{}", config.api_host, config.api_port);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", address, e)))?;

    tracing::info!("Starting server listening on {}", address);

    axum::serve(listener, api_routes(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
