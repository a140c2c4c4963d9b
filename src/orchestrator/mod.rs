//! Music creation orchestration.
//!
//! One request flows through: provider selection, optional style
//! recommendation, optional lyrics generation or polishing, prompt
//! enhancement, and render submission. Style and enhancement failures are
//! recoverable and fall back to defaults; missing-lyrics generation and
//! render submission are not.

use crate::llm::selector::{select_provider, Complexity, Priority, ProviderId, SelectionContext};
use crate::llm::{LlmError, LlmProvider};
use crate::lyrics;
use crate::registry::{GenerationMode, TrackRecord, TrackRegistry};
use crate::render::{MusicRenderer, RenderError, RenderSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Style fallback used when recommendation fails or is skipped.
#[derive(Debug, Clone)]
pub struct StyleDefaults {
    pub tags: Vec<String>,
    pub mood: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            tags: vec!["pop".to_string(), "melodic".to_string()],
            mood: "uplifting".to_string(),
        }
    }
}

/// Errors leaving the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("no LLM provider is configured and available")]
    NoProviderAvailable,

    #[error("music rendering is not configured")]
    RendererNotConfigured,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl OrchestratorError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::InvalidParams(_) => "invalid_params",
            OrchestratorError::NoProviderAvailable => "no_provider_available",
            OrchestratorError::RendererNotConfigured => "renderer_not_configured",
            OrchestratorError::Llm(e) => e.kind(),
            OrchestratorError::Render(e) => e.kind(),
        }
    }
}

/// One creation request as it arrives from the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMusicRequest {
    pub idea: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    pub mode: GenerationMode,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub provider_hint: Option<ProviderId>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub instrumental: bool,
}

/// What a creation request produced.
#[derive(Debug, Clone, Serialize)]
pub struct MusicCreation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub provider_used: String,
    /// "processing" for submitted jobs, "lyrics_only" otherwise.
    pub status: String,
}

/// The coordinating component. All collaborators are injected at
/// construction; there are no runtime setters.
pub struct Orchestrator {
    glm: Option<Arc<dyn LlmProvider>>,
    joybuilder: Option<Arc<dyn LlmProvider>>,
    renderer: Option<Arc<dyn MusicRenderer>>,
    registry: Arc<TrackRegistry>,
    is_internal_network: bool,
    style_defaults: StyleDefaults,
}

impl Orchestrator {
    pub fn new(
        glm: Option<Arc<dyn LlmProvider>>,
        joybuilder: Option<Arc<dyn LlmProvider>>,
        renderer: Option<Arc<dyn MusicRenderer>>,
        registry: Arc<TrackRegistry>,
        is_internal_network: bool,
        style_defaults: StyleDefaults,
    ) -> Self {
        Self {
            glm,
            joybuilder,
            renderer,
            registry,
            is_internal_network,
            style_defaults,
        }
    }

    fn provider_for(&self, id: ProviderId) -> Option<Arc<dyn LlmProvider>> {
        let provider = match id {
            ProviderId::Glm => self.glm.as_ref(),
            ProviderId::JoyBuilder => self.joybuilder.as_ref(),
        };
        provider.filter(|p| p.is_available()).cloned()
    }

    /// Resolve the provider for this request: an available hinted provider
    /// wins, a configured-but-unavailable hint falls back transparently,
    /// and without a hint the selection policy decides.
    fn choose_provider(
        &self,
        hint: Option<ProviderId>,
        mode: GenerationMode,
        priority: Option<Priority>,
    ) -> Result<(ProviderId, Arc<dyn LlmProvider>), OrchestratorError> {
        if let Some(hinted) = hint {
            if let Some(provider) = self.provider_for(hinted) {
                return Ok((hinted, provider));
            }
            if let Some(provider) = self.provider_for(hinted.other()) {
                warn!(
                    hinted = hinted.as_str(),
                    fallback = hinted.other().as_str(),
                    "Hinted provider unavailable, falling back"
                );
                return Ok((hinted.other(), provider));
            }
            return Err(OrchestratorError::NoProviderAvailable);
        }

        let ctx = SelectionContext {
            is_internal_network: self.is_internal_network,
            complexity: complexity_for_mode(mode),
            priority,
        };
        let id = select_provider(
            &ctx,
            self.provider_for(ProviderId::Glm).is_some(),
            self.provider_for(ProviderId::JoyBuilder).is_some(),
        )
        .map_err(|_| OrchestratorError::NoProviderAvailable)?;

        let provider = self
            .provider_for(id)
            .ok_or(OrchestratorError::NoProviderAvailable)?;
        Ok((id, provider))
    }

    /// Run the full creation pipeline for one request.
    pub async fn create_music(
        &self,
        request: CreateMusicRequest,
    ) -> Result<MusicCreation, OrchestratorError> {
        let idea = request.idea.trim();
        if idea.is_empty() {
            return Err(OrchestratorError::InvalidParams(
                "a creative idea is required".to_string(),
            ));
        }

        let (provider_id, provider) =
            self.choose_provider(request.provider_hint, request.mode, request.priority)?;
        info!(
            provider = provider_id.as_str(),
            mode = ?request.mode,
            "Starting music creation"
        );

        // Style: caller tags win; otherwise ask the provider, falling back
        // to the defaults on any failure.
        let supplied_tags = request
            .tags
            .as_ref()
            .map(|t| t.iter().filter(|t| !t.trim().is_empty()).count() > 0)
            .unwrap_or(false);
        let (tags, mood) = if supplied_tags {
            (
                request.tags.clone().unwrap_or_default(),
                request.mood.clone(),
            )
        } else {
            let description = match &request.style {
                Some(style) => format!("{} ({})", idea, style),
                None => idea.to_string(),
            };
            match provider.recommend_style(&description).await {
                Ok(style) => {
                    debug!(tags = ?style.tags, "Style recommended");
                    (style.tags, Some(style.mood))
                }
                Err(e) => {
                    warn!(error = %e, "Style recommendation failed, using defaults");
                    (
                        self.style_defaults.tags.clone(),
                        Some(self.style_defaults.mood.clone()),
                    )
                }
            }
        };

        // Lyrics: generate when the mode needs them and none were given
        // (fatal on failure); polish supplied ones (recoverable).
        let mut title = request.title.clone();
        let mut song_lyrics: Option<String> = None;
        if request.mode.requires_lyrics() {
            let supplied = request
                .lyrics
                .as_deref()
                .filter(|l| !l.trim().is_empty());
            match supplied {
                Some(user_lyrics) => {
                    match provider
                        .polish_lyrics(user_lyrics, request.style.as_deref())
                        .await
                    {
                        Ok(polished) => song_lyrics = Some(polished),
                        Err(e) => {
                            warn!(error = %e, "Lyrics polishing failed, keeping original");
                            song_lyrics = Some(lyrics::clean_for_render(user_lyrics));
                        }
                    }
                }
                None => {
                    let generated = provider
                        .generate_lyrics(idea, request.style.as_deref(), request.mood.as_deref())
                        .await?;
                    if title.is_none() {
                        title = Some(generated.title);
                    }
                    song_lyrics = Some(generated.lyrics);
                }
            }
        }

        // Prompt enhancement: recoverable, keeps the raw idea on failure.
        let prompt_source = match &request.style {
            Some(style) => format!("{}, {}", idea, style),
            None => idea.to_string(),
        };
        let prompt = match provider.enhance_prompt(&prompt_source).await {
            Ok(enhanced) if !enhanced.is_empty() => enhanced,
            Ok(_) => prompt_source.clone(),
            Err(e) => {
                warn!(error = %e, "Prompt enhancement failed, using raw prompt");
                prompt_source.clone()
            }
        };

        if !request.mode.renders() {
            return Ok(MusicCreation {
                job_id: None,
                title,
                lyrics: song_lyrics,
                tags,
                mood,
                provider_used: provider_id.as_str().to_string(),
                status: "lyrics_only".to_string(),
            });
        }

        let renderer = self
            .renderer
            .as_ref()
            .ok_or(OrchestratorError::RendererNotConfigured)?;

        let spec = if request.mode.requires_lyrics() {
            RenderSpec::Custom {
                title: title.clone(),
                lyrics: song_lyrics.clone(),
                tags: Some(tags.join(", ")),
                instrumental: request.instrumental,
                model_version: request.model_version.clone(),
            }
        } else {
            RenderSpec::Inspiration {
                prompt,
                instrumental: request.instrumental,
                model_version: request.model_version.clone(),
            }
        };

        let job_id = renderer.submit(spec).await?;

        let mut record = TrackRecord::new(&job_id, request.mode).with_tags(tags.clone());
        record.title = title.clone();
        record.lyrics = song_lyrics.clone();
        self.registry.insert(record);

        info!(job_id = %job_id, provider = provider_id.as_str(), "Render job submitted");

        Ok(MusicCreation {
            job_id: Some(job_id),
            title,
            lyrics: song_lyrics,
            tags,
            mood,
            provider_used: provider_id.as_str().to_string(),
            status: "processing".to_string(),
        })
    }

    pub fn registry(&self) -> &Arc<TrackRegistry> {
        &self.registry
    }
}

fn complexity_for_mode(mode: GenerationMode) -> Complexity {
    match mode {
        GenerationMode::FullAi | GenerationMode::WholeSong => Complexity::Complex,
        GenerationMode::LyricsOnly => Complexity::Medium,
        _ => Complexity::Simple,
    }
}
