pub mod cors;
pub mod middleware;
pub mod state;
mod v3;
mod v4;

pub use state::AppState;

use crate::config::Config;
use crate::types::format_date_time;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use std::net::SocketAddr;
use tracing::info;

/// Health check endpoint
pub(crate) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cla-backend",
        "timeStamp": format_date_time(&Utc::now()),
    }))
}

pub(crate) async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": env!("CARGO_PKG_NAME"),
    }))
}

/// Prometheus scrape endpoint
async fn prometheus_metrics() -> Response {
    match crate::observability::render() {
        Some(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP server with the v1 (`/v3`) and v2 (`/v4`) APIs
pub fn create_server(state: AppState, config: &Config) -> Router {
    let cors = cors::cors_layer(config.local_mode, config.allowed_origins.clone());

    Router::new()
        .nest("/v3", v3::routes())
        .nest("/v4", v4::routes())
        .route("/metrics", get(prometheus_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::create_user_from_request,
        ))
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured port
pub async fn start_server(state: AppState, config: &Config) -> crate::error::Result<()> {
    let app = create_server(state, config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP server running on http://localhost:{}", config.port);
    info!("Health check: http://localhost:{}/v3/ops/health", config.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("unable to listen for shutdown signal: {}", e);
    }
}
