pub mod config;
mod http_layers;
mod music_routes;
pub mod server;
pub mod state;
mod track_routes;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::{make_app, run_server};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Body of every error answer.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

fn status_for_kind(kind: &'static str) -> StatusCode {
    match kind {
        "invalid_params" => StatusCode::BAD_REQUEST,
        "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
        "no_provider_available" | "renderer_not_configured" => StatusCode::SERVICE_UNAVAILABLE,
        "timeout" => StatusCode::GATEWAY_TIMEOUT,
        "not_found" => StatusCode::NOT_FOUND,
        // auth_failed / generation_failed / render_failed: our upstream
        // misbehaved, not the caller.
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Map an error kind plus human-readable message to an HTTP answer.
pub(crate) fn error_response(kind: &'static str, message: String) -> Response {
    (status_for_kind(kind), Json(ErrorBody { error: kind, message })).into_response()
}
