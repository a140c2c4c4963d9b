//! Rendering job model and request specs.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Canonical job state. Vendor status codes are mapped onto this set and
/// never leak past the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Queued,
    Rendering,
    Complete,
    Failed,
}

impl RenderStatus {
    /// Map the vendor's numeric status. Unknown or missing codes read as
    /// still-queued, the safe non-terminal default.
    pub fn from_vendor_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => RenderStatus::Queued,
            Some(2) => RenderStatus::Rendering,
            Some(3) => RenderStatus::Complete,
            Some(4) => RenderStatus::Failed,
            _ => RenderStatus::Queued,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderStatus::Complete | RenderStatus::Failed)
    }

    /// The three-state vocabulary exposed to external callers.
    pub fn public_label(&self) -> &'static str {
        match self {
            RenderStatus::Queued | RenderStatus::Rendering => "processing",
            RenderStatus::Complete => "complete",
            RenderStatus::Failed => "error",
        }
    }

    /// Ordering rank used to keep transitions monotonic.
    pub fn rank(&self) -> u8 {
        match self {
            RenderStatus::Queued => 0,
            RenderStatus::Rendering => 1,
            RenderStatus::Complete | RenderStatus::Failed => 2,
        }
    }
}

impl Serialize for RenderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.public_label())
    }
}

/// One in-flight or completed rendering job.
#[derive(Debug, Clone, Serialize)]
pub struct RenderJob {
    pub id: String,
    pub status: RenderStatus,
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
    /// Present only when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RenderJob {
    pub fn new(id: impl Into<String>, status: RenderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            title: None,
            lyrics: None,
            audio_url: None,
            video_url: None,
            image_url: None,
            duration_seconds: None,
            error_message: None,
        }
    }

    /// A job that failed before or at the vendor, with its reason.
    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut job = Self::new(id, RenderStatus::Failed);
        job.error_message = Some(message.into());
        job
    }
}

/// What to render. Exactly one of a free-text prompt or lyrics drives the
/// generation, depending on the variant.
#[derive(Debug, Clone)]
pub enum RenderSpec {
    /// Free-text description, the vendor writes everything itself.
    Inspiration {
        prompt: String,
        instrumental: bool,
        model_version: Option<String>,
    },
    /// Caller-controlled title/lyrics/tags.
    Custom {
        title: Option<String>,
        lyrics: Option<String>,
        tags: Option<String>,
        instrumental: bool,
        model_version: Option<String>,
    },
    /// Continue an existing track from a time offset.
    Extend {
        source_job_id: String,
        continue_at: Option<f64>,
        prompt: Option<String>,
        model_version: Option<String>,
    },
    /// Re-render an existing track in a new style.
    Cover {
        source_job_id: String,
        tags: Option<String>,
        model_version: Option<String>,
    },
}

impl RenderSpec {
    /// Validate the prompt/lyrics contract before anything goes on the
    /// wire.
    pub fn validate(&self) -> Result<(), RenderError> {
        match self {
            RenderSpec::Inspiration { prompt, .. } => {
                if prompt.trim().is_empty() {
                    return Err(RenderError::InvalidParams(
                        "inspiration mode requires a prompt".to_string(),
                    ));
                }
            }
            RenderSpec::Custom {
                lyrics,
                instrumental,
                tags,
                ..
            } => {
                let has_lyrics = lyrics.as_deref().is_some_and(|l| !l.trim().is_empty());
                if !has_lyrics && !instrumental {
                    return Err(RenderError::InvalidParams(
                        "custom mode requires lyrics unless instrumental".to_string(),
                    ));
                }
                if *instrumental && !has_lyrics && tags.as_deref().unwrap_or("").trim().is_empty()
                {
                    return Err(RenderError::InvalidParams(
                        "instrumental custom mode requires style tags".to_string(),
                    ));
                }
            }
            RenderSpec::Extend { source_job_id, .. }
            | RenderSpec::Cover { source_job_id, .. } => {
                if source_job_id.trim().is_empty() {
                    return Err(RenderError::InvalidParams(
                        "a source track id is required".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn model_version(&self) -> Option<&str> {
        match self {
            RenderSpec::Inspiration { model_version, .. }
            | RenderSpec::Custom { model_version, .. }
            | RenderSpec::Extend { model_version, .. }
            | RenderSpec::Cover { model_version, .. } => model_version.as_deref(),
        }
    }
}

/// Normalize a caller-facing model alias to the vendor identifier.
///
/// Unknown aliases pass through unchanged so newer vendor models work
/// without a code change.
pub fn normalize_model_version(alias: &str) -> String {
    match alias.to_ascii_lowercase().as_str() {
        "v3" => "chirp-v3-0".to_string(),
        "v3.5" => "chirp-v3-5".to_string(),
        "v4" => "chirp-v4".to_string(),
        _ => alias.to_string(),
    }
}

/// Errors that can cross the rendering adapter boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("rendering gateway rejected the credentials")]
    AuthFailed,

    #[error("rendering gateway rate limit exceeded")]
    RateLimited,

    #[error("rendering request timed out")]
    Timeout,

    #[error("rendering failed: {0}")]
    RenderFailed(String),
}

impl RenderError {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::InvalidParams(_) => "invalid_params",
            RenderError::AuthFailed => "auth_failed",
            RenderError::RateLimited => "rate_limited",
            RenderError::Timeout => "timeout",
            RenderError::RenderFailed(_) => "render_failed",
        }
    }
}
