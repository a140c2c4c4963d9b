//! HTTP client for the Suno-compatible rendering gateway.

use super::models::{normalize_model_version, RenderError, RenderJob, RenderSpec, RenderStatus};
use super::MusicRenderer;
use crate::lyrics;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of job ids per batch query.
pub const MAX_BATCH_IDS: usize = 50;

const VENDOR_OK: i64 = 200;

/// Client for the rendering gateway.
pub struct SunoClient {
    client: Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

impl SunoClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the gateway (e.g. "https://suno-gw.example.com")
    /// * `api_key` - Bearer credential
    /// * `timeout_sec` - Per-request timeout in seconds
    /// * `default_model` - Model used when a spec names none
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_sec: u64,
        default_model: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_model(&self, spec: &RenderSpec) -> String {
        normalize_model_version(spec.model_version().unwrap_or(&self.default_model))
    }

    fn build_payload(&self, spec: &RenderSpec) -> GenerateRequest {
        let model = self.resolve_model(spec);
        match spec {
            RenderSpec::Inspiration {
                prompt,
                instrumental,
                ..
            } => GenerateRequest {
                gpt_description_prompt: Some(prompt.clone()),
                make_instrumental: *instrumental,
                mv: model,
                task_type: "generate".to_string(),
                ..Default::default()
            },
            RenderSpec::Custom {
                title,
                lyrics: raw_lyrics,
                tags,
                instrumental,
                ..
            } => GenerateRequest {
                prompt: raw_lyrics.as_deref().map(lyrics::clean_for_render),
                title: title.clone(),
                tags: tags.clone(),
                make_instrumental: *instrumental,
                mv: model,
                task_type: "generate".to_string(),
                ..Default::default()
            },
            RenderSpec::Extend {
                source_job_id,
                continue_at,
                prompt,
                ..
            } => GenerateRequest {
                gpt_description_prompt: prompt.clone(),
                continue_clip_id: Some(source_job_id.clone()),
                continue_at: *continue_at,
                mv: model,
                task_type: "extend".to_string(),
                ..Default::default()
            },
            RenderSpec::Cover {
                source_job_id,
                tags,
                ..
            } => GenerateRequest {
                continue_clip_id: Some(source_job_id.clone()),
                tags: tags.clone(),
                mv: model,
                task_type: "cover".to_string(),
                ..Default::default()
            },
        }
    }

    fn map_transport_error(e: reqwest::Error) -> RenderError {
        if e.is_timeout() || e.is_connect() {
            RenderError::Timeout
        } else {
            RenderError::RenderFailed(e.to_string())
        }
    }

    fn check_http_status(status: u16) -> Result<(), RenderError> {
        match status {
            401 | 403 => Err(RenderError::AuthFailed),
            429 => Err(RenderError::RateLimited),
            s if !(200..300).contains(&s) => Err(RenderError::RenderFailed(format!(
                "gateway answered HTTP {}",
                s
            ))),
            _ => Ok(()),
        }
    }

    /// Fetch jobs from the gateway. The outer error is transport-level;
    /// the inner variant reports a vendor application-level error.
    async fn fetch_jobs(&self, job_ids: &[String]) -> Result<QueryOutcome, RenderError> {
        let url = format!("{}/v1/music/query", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&QueryRequest {
                ids: job_ids.to_vec(),
            })
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Self::check_http_status(response.status().as_u16())?;

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            RenderError::RenderFailed(format!("failed to parse gateway response: {}", e))
        })?;

        if parsed.code != VENDOR_OK {
            let msg = parsed
                .msg
                .unwrap_or_else(|| format!("gateway error code {}", parsed.code));
            return Ok(QueryOutcome::VendorError(msg));
        }

        let jobs = parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(VendorJob::into_render_job)
            .collect();
        Ok(QueryOutcome::Jobs(jobs))
    }
}

enum QueryOutcome {
    Jobs(Vec<RenderJob>),
    VendorError(String),
}

#[async_trait]
impl MusicRenderer for SunoClient {
    async fn submit(&self, spec: RenderSpec) -> Result<String, RenderError> {
        spec.validate()?;

        let payload = self.build_payload(&spec);
        let url = format!("{}/v1/music/generate", self.base_url);

        debug!(
            task_type = %payload.task_type,
            model = %payload.mv,
            "Submitting render job to gateway"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Self::check_http_status(response.status().as_u16())?;

        let parsed: SubmitResponse = response.json().await.map_err(|e| {
            RenderError::RenderFailed(format!("failed to parse gateway response: {}", e))
        })?;

        if parsed.code != VENDOR_OK {
            let msg = parsed
                .msg
                .unwrap_or_else(|| format!("gateway error code {}", parsed.code));
            return Err(RenderError::RenderFailed(msg));
        }

        let task_id = parsed
            .data
            .map(|d| d.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                RenderError::RenderFailed("gateway returned no task id".to_string())
            })?;

        debug!(job_id = %task_id, "Render job accepted");
        Ok(task_id)
    }

    async fn query(&self, job_id: &str) -> Result<RenderJob, RenderError> {
        let ids = [job_id.to_string()];
        match self.fetch_jobs(&ids).await? {
            QueryOutcome::Jobs(jobs) => Ok(jobs
                .into_iter()
                .find(|j| j.id == job_id)
                // A job the gateway does not report yet reads as queued.
                .unwrap_or_else(|| RenderJob::new(job_id, RenderStatus::Queued))),
            QueryOutcome::VendorError(msg) => {
                warn!(job_id = %job_id, error = %msg, "Gateway reported job error");
                Ok(RenderJob::failed(job_id, msg))
            }
        }
    }

    async fn query_batch(&self, job_ids: &[String]) -> Result<Vec<RenderJob>, RenderError> {
        if job_ids.len() > MAX_BATCH_IDS {
            return Err(RenderError::InvalidParams(format!(
                "at most {} ids per batch query, got {}",
                MAX_BATCH_IDS,
                job_ids.len()
            )));
        }
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        match self.fetch_jobs(job_ids).await? {
            QueryOutcome::Jobs(jobs) => Ok(jobs),
            QueryOutcome::VendorError(msg) => Err(RenderError::RenderFailed(msg)),
        }
    }
}

// Gateway API types

#[derive(Debug, Default, Serialize)]
struct GenerateRequest {
    /// Lyrics, when the caller controls them.
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    /// Free-text description, when the vendor writes the song.
    #[serde(skip_serializing_if = "Option::is_none")]
    gpt_description_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<String>,
    make_instrumental: bool,
    mv: String,
    task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    continue_clip_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continue_at: Option<f64>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Vec<VendorJob>>,
}

#[derive(Debug, Deserialize)]
struct VendorJob {
    id: String,
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    lyric: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    fail_reason: Option<String>,
}

impl VendorJob {
    fn into_render_job(self) -> RenderJob {
        let status = RenderStatus::from_vendor_code(self.status);
        RenderJob {
            id: self.id,
            status,
            title: self.title,
            lyrics: self.lyric,
            audio_url: self.audio_url,
            video_url: self.video_url,
            image_url: self.image_url,
            duration_seconds: self.duration,
            error_message: if status == RenderStatus::Failed {
                self.fail_reason
                    .or_else(|| Some("render failed".to_string()))
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SunoClient {
        // Unroutable address: any accidental network call fails loudly as
        // a transport error, not InvalidParams.
        SunoClient::new("http://127.0.0.1:1", "key", 5, "chirp-v3-5")
    }

    #[test]
    fn test_trailing_slash_removal() {
        let c = SunoClient::new("https://gw.example.com/", "k", 5, "chirp-v3-5");
        assert_eq!(c.base_url(), "https://gw.example.com");
    }

    #[tokio::test]
    async fn test_batch_limit_rejected_before_network() {
        let ids: Vec<String> = (0..51).map(|i| format!("job-{}", i)).collect();
        let err = client().query_batch(&ids).await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let jobs = client().query_batch(&[]).await.unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_submit_validates_before_network() {
        let spec = RenderSpec::Inspiration {
            prompt: String::new(),
            instrumental: false,
            model_version: None,
        };
        let err = client().submit(spec).await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidParams(_)));
    }

    #[test]
    fn test_payload_for_custom_cleans_lyrics() {
        let spec = RenderSpec::Custom {
            title: Some("Song".to_string()),
            lyrics: Some("[主歌]\n词（和声）".to_string()),
            tags: Some("pop".to_string()),
            instrumental: false,
            model_version: Some("v4".to_string()),
        };
        let payload = client().build_payload(&spec);
        assert_eq!(payload.prompt.as_deref(), Some("[Verse]\n词"));
        assert_eq!(payload.mv, "chirp-v4");
        assert_eq!(payload.task_type, "generate");
        assert!(payload.gpt_description_prompt.is_none());
    }

    #[test]
    fn test_payload_for_inspiration_uses_description() {
        let spec = RenderSpec::Inspiration {
            prompt: "a rainy jazz evening".to_string(),
            instrumental: true,
            model_version: None,
        };
        let payload = client().build_payload(&spec);
        assert_eq!(
            payload.gpt_description_prompt.as_deref(),
            Some("a rainy jazz evening")
        );
        assert!(payload.prompt.is_none());
        assert!(payload.make_instrumental);
        // Default model resolved through the alias table untouched.
        assert_eq!(payload.mv, "chirp-v3-5");
    }

    #[test]
    fn test_payload_for_extend_and_cover() {
        let extend = RenderSpec::Extend {
            source_job_id: "src-1".to_string(),
            continue_at: Some(42.5),
            prompt: None,
            model_version: None,
        };
        let payload = client().build_payload(&extend);
        assert_eq!(payload.task_type, "extend");
        assert_eq!(payload.continue_clip_id.as_deref(), Some("src-1"));
        assert_eq!(payload.continue_at, Some(42.5));

        let cover = RenderSpec::Cover {
            source_job_id: "src-2".to_string(),
            tags: Some("lofi".to_string()),
            model_version: None,
        };
        let payload = client().build_payload(&cover);
        assert_eq!(payload.task_type, "cover");
        assert_eq!(payload.tags.as_deref(), Some("lofi"));
    }

    #[test]
    fn test_vendor_job_conversion() {
        let vendor = VendorJob {
            id: "j1".to_string(),
            status: Some(4),
            title: None,
            lyric: None,
            audio_url: None,
            video_url: None,
            image_url: None,
            duration: None,
            fail_reason: Some("content policy".to_string()),
        };
        let job = vendor.into_render_job();
        assert_eq!(job.status, RenderStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("content policy"));

        let vendor = VendorJob {
            id: "j2".to_string(),
            status: Some(3),
            title: Some("Done".to_string()),
            lyric: None,
            audio_url: Some("https://cdn.example.com/j2.mp3".to_string()),
            video_url: None,
            image_url: None,
            duration: Some(182.0),
            fail_reason: None,
        };
        let job = vendor.into_render_job();
        assert_eq!(job.status, RenderStatus::Complete);
        assert!(job.error_message.is_none());
        assert_eq!(job.duration_seconds, Some(182.0));
    }
}
