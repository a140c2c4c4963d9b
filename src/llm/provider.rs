//! LLM provider trait definition.
//!
//! The creative operations (lyrics, style, prompt enhancement, polishing)
//! are provided methods on top of the one required `complete` call, so
//! every backend exposes the same contract and the orchestrator never
//! depends on a concrete vendor.

use super::json_repair::repair_and_parse;
use super::prompts;
use super::types::{CompletionOptions, Message};
use crate::lyrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can cross the LLM adapter boundary.
///
/// Transport-level failures are mapped onto these four kinds inside each
/// adapter; callers never see raw HTTP errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider rejected the credentials")]
    AuthFailed,

    #[error("LLM provider rate limit exceeded")]
    RateLimited,

    #[error("LLM request timed out or got no response")]
    Timeout,

    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

impl LlmError {
    /// Stable machine-readable kind, used by the HTTP layer for status
    /// mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::AuthFailed => "auth_failed",
            LlmError::RateLimited => "rate_limited",
            LlmError::Timeout => "timeout",
            LlmError::GenerationFailed(_) => "generation_failed",
        }
    }
}

/// A generated song: title plus lyrics using the canonical English section
/// markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsResult {
    pub title: String,
    pub lyrics: String,
}

/// A recommended production style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRecommendation {
    /// Genre/instrument keywords, deduplicated, first-seen order.
    pub tags: Vec<String>,
    pub mood: String,
    pub tempo: String,
}

#[derive(Debug, Deserialize)]
struct RawLyrics {
    #[serde(default)]
    title: String,
    #[serde(default)]
    lyrics: String,
}

#[derive(Debug, Deserialize)]
struct RawStyle {
    tags: Option<Vec<String>>,
    mood: Option<String>,
    tempo: Option<String>,
}

/// Trait for LLM providers.
///
/// Implementations connect to different chat-completion backends while
/// providing a unified interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// The provider's name (e.g. "glm", "joybuilder").
    fn name(&self) -> &str;

    /// The default model in use.
    fn model(&self) -> &str;

    /// True iff endpoint URL and credential are both configured.
    fn is_available(&self) -> bool;

    /// Run one chat completion and return the assistant text.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;

    /// Generate a titled set of lyrics for a creative idea.
    async fn generate_lyrics(
        &self,
        idea: &str,
        style: Option<&str>,
        mood: Option<&str>,
    ) -> Result<LyricsResult, LlmError> {
        let messages = [
            Message::system(prompts::LYRICS_SYSTEM),
            Message::user(prompts::lyrics_user(idea, style, mood)),
        ];
        let text = self
            .complete(&messages, &CompletionOptions::creative())
            .await?;

        let raw: RawLyrics = repair_and_parse(&text)
            .map_err(|e| LlmError::GenerationFailed(e.to_string()))?;
        if raw.title.trim().is_empty() || raw.lyrics.trim().is_empty() {
            return Err(LlmError::GenerationFailed(
                "response is missing title or lyrics".to_string(),
            ));
        }

        Ok(LyricsResult {
            title: raw.title.trim().to_string(),
            lyrics: lyrics::canonicalize_section_markers(raw.lyrics.trim()),
        })
    }

    /// Rewrite a free-text music prompt into a more vivid one.
    async fn enhance_prompt(&self, text: &str) -> Result<String, LlmError> {
        let messages = [
            Message::system(prompts::ENHANCE_SYSTEM),
            Message::user(text.to_string()),
        ];
        let response = self.complete(&messages, &CompletionOptions::fast()).await?;
        Ok(strip_code_fences(&response).trim().to_string())
    }

    /// Recommend tags/mood/tempo for a free-text description.
    async fn recommend_style(&self, description: &str) -> Result<StyleRecommendation, LlmError> {
        let messages = [
            Message::system(prompts::STYLE_SYSTEM),
            Message::user(prompts::style_user(description)),
        ];
        let text = self.complete(&messages, &CompletionOptions::fast()).await?;

        let raw: RawStyle = repair_and_parse(&text)
            .map_err(|e| LlmError::GenerationFailed(e.to_string()))?;
        let (tags, mood, tempo) = match (raw.tags, raw.mood, raw.tempo) {
            (Some(tags), Some(mood), Some(tempo)) if !tags.is_empty() => (tags, mood, tempo),
            _ => {
                return Err(LlmError::GenerationFailed(
                    "style response is missing tags, mood or tempo".to_string(),
                ))
            }
        };

        Ok(StyleRecommendation {
            tags: dedup_preserving_order(tags),
            mood,
            tempo,
        })
    }

    /// Rewrite existing lyrics, preserving their section structure.
    async fn polish_lyrics(
        &self,
        raw_lyrics: &str,
        style: Option<&str>,
    ) -> Result<String, LlmError> {
        let messages = [
            Message::system(prompts::POLISH_SYSTEM),
            Message::user(prompts::polish_user(raw_lyrics, style)),
        ];
        let response = self
            .complete(&messages, &CompletionOptions::creative())
            .await?;
        let polished = strip_code_fences(&response);
        Ok(lyrics::clean_for_render(&polished))
    }
}

/// Remove a wrapping markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body_start) = rest.find('\n') else {
        return trimmed;
    };
    let body = &rest[body_start + 1..];
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}
