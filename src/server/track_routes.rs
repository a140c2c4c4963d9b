//! Track registry HTTP routes: listing, favorites, edits, deletion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error_response;
use super::state::{GuardedTrackRegistry, ServerState};
use crate::registry::TrackRecord;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub favorites: bool,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct TrackListResponse {
    pub tracks: Vec<TrackRecord>,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteBody {
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct EditBody {
    pub title: String,
}

/// GET / - paginated track listing, newest first.
async fn list_tracks(
    State(registry): State<GuardedTrackRegistry>,
    Query(query): Query<ListQuery>,
) -> Response {
    let (tracks, total_count) = registry.list(query.offset, query.limit, query.favorites);
    Json(TrackListResponse {
        tracks,
        total_count,
    })
    .into_response()
}

/// GET /{id} - one registry record.
async fn get_track(
    State(registry): State<GuardedTrackRegistry>,
    Path(id): Path<String>,
) -> Response {
    match registry.get(&id) {
        Some(record) => Json(record).into_response(),
        None => error_response("not_found", format!("no track with id {}", id)),
    }
}

/// POST /{id}/favorite - toggle the favorite flag.
async fn set_favorite(
    State(registry): State<GuardedTrackRegistry>,
    Path(id): Path<String>,
    Json(body): Json<FavoriteBody>,
) -> Response {
    if registry.set_favorite(&id, body.is_favorite) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response("not_found", format!("no track with id {}", id))
    }
}

/// PATCH /{id} - edit track metadata (title).
async fn edit_track(
    State(registry): State<GuardedTrackRegistry>,
    Path(id): Path<String>,
    Json(body): Json<EditBody>,
) -> Response {
    let title = body.title.trim();
    if title.is_empty() {
        return error_response("invalid_params", "title must not be empty".to_string());
    }
    if registry.set_title(&id, title) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response("not_found", format!("no track with id {}", id))
    }
}

/// DELETE /{id} - remove a track from the registry.
async fn delete_track(
    State(registry): State<GuardedTrackRegistry>,
    Path(id): Path<String>,
) -> Response {
    if registry.remove(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response("not_found", format!("no track with id {}", id))
    }
}

pub fn track_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_tracks))
        .route(
            "/{id}",
            get(get_track).patch(edit_track).delete(delete_track),
        )
        .route("/{id}/favorite", post(set_favorite))
}
