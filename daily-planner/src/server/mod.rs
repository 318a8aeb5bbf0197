//! Upload server
//!
//! Routes:
//!
//! - `POST /upload`: one image under the multipart field `planner`,
//!   answered with `{"url": ...}`
//! - `GET /uploads/{filename}`: images stored by the disk backend
//! - `GET /health`: liveness probe

mod files;
mod upload;

pub use files::{serve_upload, CACHE_MAX_AGE};
pub use upload::{upload, UploadResponse};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::state::AppState;

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the upload server router
pub fn router(state: AppState) -> Router {
    let settings = &state.config().server;
    let cors_enabled = settings.cors_enabled;
    let body_limit = settings.max_upload_bytes;

    let router = Router::new()
        .route("/upload", post(upload))
        .route("/uploads/{filename}", get(serve_upload))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// # Errors
///
/// Returns an error if the server fails while running
pub async fn serve_with_shutdown(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(
        %addr,
        backend = state.host().name(),
        public_url = %state.config().server.public_base_url(),
        "Upload server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Upload server stopped");
    Ok(())
}

/// Bind the configured address and serve until Ctrl+C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.config().server.bind_addr()).await?;
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
