//! Music generation HTTP routes.
//!
//! Provides endpoints for:
//! - AI-orchestrated creation (lyrics + style + render in one call)
//! - Direct custom/extend/cover submissions that bypass the LLM stages
//! - Job status queries (single, batch, blocking wait)

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::state::{GuardedOrchestrator, OptionalRenderer, ServerState};
use super::{error_response, ServerConfig};
use crate::lyrics;
use crate::orchestrator::CreateMusicRequest;
use crate::registry::{GenerationMode, TrackRecord, TrackRegistry};
use crate::render::{MusicRenderer, RenderError, RenderJob, RenderSpec};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CustomGenerateBody {
    pub title: Option<String>,
    pub lyrics: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub instrumental: bool,
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtendBody {
    pub source_job_id: String,
    pub continue_at: Option<f64>,
    pub prompt: Option<String>,
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverBody {
    pub source_job_id: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchQueryBody {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaitQuery {
    pub timeout_ms: Option<u64>,
    pub poll_ms: Option<u64>,
}

/// Response for job submissions that bypass the orchestrator.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: &'static str,
}

/// Status answer for a single job, always in the public three-state
/// vocabulary.
#[derive(Debug, Serialize)]
pub struct TrackStatusResponse {
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TrackStatusResponse {
    fn from_job(job: &RenderJob) -> Self {
        Self {
            id: job.id.clone(),
            status: job.status.public_label(),
            title: job.title.clone(),
            lyrics: job.lyrics.clone(),
            audio_url: job.audio_url.clone(),
            video_url: job.video_url.clone(),
            image_url: job.image_url.clone(),
            duration_seconds: job.duration_seconds,
            error_message: job.error_message.clone(),
        }
    }

    fn from_record(record: &TrackRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status.public_label(),
            title: record.title.clone(),
            lyrics: record.lyrics.clone(),
            audio_url: record.audio_url.clone(),
            video_url: record.video_url.clone(),
            image_url: record.image_url.clone(),
            duration_seconds: record.duration_seconds,
            error_message: record.error_message.clone(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn get_renderer(renderer: &OptionalRenderer) -> Result<&Arc<dyn MusicRenderer>, Response> {
    renderer.as_ref().ok_or_else(|| {
        error_response(
            "renderer_not_configured",
            "music rendering is not configured".to_string(),
        )
    })
}

fn render_error_response(e: RenderError) -> Response {
    error_response(e.kind(), e.to_string())
}

/// Merge a queried job into the registry, then answer from the registry so
/// terminal states never regress in what callers see.
fn status_response(registry: &TrackRegistry, job: &RenderJob) -> TrackStatusResponse {
    registry.merge_job(job);
    match registry.get(&job.id) {
        Some(record) => TrackStatusResponse::from_record(&record),
        None => TrackStatusResponse::from_job(job),
    }
}

fn join_tags(tags: Option<Vec<String>>) -> Option<String> {
    tags.map(|t| t.join(", ")).filter(|t| !t.is_empty())
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /ai - orchestrated creation (style + lyrics + render).
async fn create_with_ai(
    State(orchestrator): State<GuardedOrchestrator>,
    Json(request): Json<CreateMusicRequest>,
) -> Response {
    match orchestrator.create_music(request).await {
        Ok(creation) => Json(creation).into_response(),
        Err(e) => error_response(e.kind(), e.to_string()),
    }
}

/// POST /custom - direct submission with caller-supplied fields.
async fn generate_custom(
    State(state): State<ServerState>,
    Json(body): Json<CustomGenerateBody>,
) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    let cleaned_lyrics = body
        .lyrics
        .as_deref()
        .map(lyrics::clean_for_render)
        .filter(|l| !l.is_empty());
    let spec = RenderSpec::Custom {
        title: body.title.clone(),
        lyrics: cleaned_lyrics.clone(),
        tags: join_tags(body.tags.clone()),
        instrumental: body.instrumental,
        model_version: body.model_version,
    };

    match renderer.submit(spec).await {
        Ok(job_id) => {
            let mut record = TrackRecord::new(&job_id, GenerationMode::Custom)
                .with_tags(body.tags.unwrap_or_default());
            record.title = body.title;
            record.lyrics = cleaned_lyrics;
            state.registry.insert(record);
            Json(SubmitJobResponse {
                job_id,
                status: "processing",
            })
            .into_response()
        }
        Err(e) => render_error_response(e),
    }
}

/// POST /extend - continue an existing track.
async fn extend_track(
    State(state): State<ServerState>,
    Json(body): Json<ExtendBody>,
) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    let spec = RenderSpec::Extend {
        source_job_id: body.source_job_id,
        continue_at: body.continue_at,
        prompt: body.prompt,
        model_version: body.model_version,
    };

    match renderer.submit(spec).await {
        Ok(job_id) => {
            state
                .registry
                .insert(TrackRecord::new(&job_id, GenerationMode::Extend));
            Json(SubmitJobResponse {
                job_id,
                status: "processing",
            })
            .into_response()
        }
        Err(e) => render_error_response(e),
    }
}

/// POST /cover - re-render an existing track in a new style.
async fn cover_track(State(state): State<ServerState>, Json(body): Json<CoverBody>) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    let spec = RenderSpec::Cover {
        source_job_id: body.source_job_id,
        tags: join_tags(body.tags.clone()),
        model_version: body.model_version,
    };

    match renderer.submit(spec).await {
        Ok(job_id) => {
            let record = TrackRecord::new(&job_id, GenerationMode::Cover)
                .with_tags(body.tags.unwrap_or_default());
            state.registry.insert(record);
            Json(SubmitJobResponse {
                job_id,
                status: "processing",
            })
            .into_response()
        }
        Err(e) => render_error_response(e),
    }
}

/// GET /{id} - current status of one job.
async fn get_status(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    match renderer.query(&id).await {
        Ok(job) => Json(status_response(&state.registry, &job)).into_response(),
        Err(e) => render_error_response(e),
    }
}

/// POST /batch - status of up to 50 jobs.
async fn batch_status(
    State(state): State<ServerState>,
    Json(body): Json<BatchQueryBody>,
) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    match renderer.query_batch(&body.ids).await {
        Ok(jobs) => {
            let statuses: Vec<TrackStatusResponse> = jobs
                .iter()
                .map(|job| status_response(&state.registry, job))
                .collect();
            Json(statuses).into_response()
        }
        Err(e) => render_error_response(e),
    }
}

/// GET /{id}/wait - block until the job is terminal or the budget runs out.
async fn wait_for_track(
    State(state): State<ServerState>,
    State(config): State<ServerConfig>,
    Path(id): Path<String>,
    Query(query): Query<WaitQuery>,
) -> Response {
    let renderer = match get_renderer(&state.renderer) {
        Ok(r) => r,
        Err(e) => return e,
    };

    let max_wait = query
        .timeout_ms
        .unwrap_or(config.wait_max_ms)
        .min(config.wait_max_ms);
    let poll_interval = query
        .poll_ms
        .unwrap_or(config.wait_poll_interval_ms)
        .max(100);

    debug!(job_id = %id, max_wait_ms = max_wait, "Waiting for render job");

    match renderer
        .wait_for_completion(
            &id,
            Duration::from_millis(max_wait),
            Duration::from_millis(poll_interval),
        )
        .await
    {
        Ok(job) => Json(status_response(&state.registry, &job)).into_response(),
        Err(e) => render_error_response(e),
    }
}

// =============================================================================
// Router Construction
// =============================================================================

pub fn music_routes() -> Router<ServerState> {
    Router::new()
        .route("/ai", post(create_with_ai))
        .route("/custom", post(generate_custom))
        .route("/extend", post(extend_track))
        .route("/cover", post(cover_track))
        .route("/batch", post(batch_status))
        .route("/{id}", get(get_status))
        .route("/{id}/wait", get(wait_for_track))
}
