//! App assembly and server lifecycle.

use super::http_layers::log_requests;
use super::music_routes::music_routes;
use super::state::ServerState;
use super::track_routes::track_routes;
use anyhow::Result;
use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::info;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the full application router for the given state.
///
/// Shared with the integration tests, which bind it to a random port.
pub fn make_app(state: ServerState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .nest("/v1/music", music_routes())
        .nest("/v1/tracks", track_routes());

    if let Some(frontend_dir) = &state.config.frontend_dir_path {
        info!("Serving frontend from {}", frontend_dir);
        app = app.fallback_service(ServeDir::new(frontend_dir));
    }

    app.layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

/// Bind and serve until the cancellation token fires.
pub async fn run_server(state: ServerState, port: u16, shutdown: CancellationToken) -> Result<()> {
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
