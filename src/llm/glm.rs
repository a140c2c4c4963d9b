//! GLM chat-completion provider.
//!
//! Talks to the public GLM OpenAI-compatible endpoint. Besides the default
//! model, GLM exposes a free fast model that short utility completions are
//! routed to via `CompletionOptions::prefer_fast_model`.

use super::provider::{LlmError, LlmProvider};
use super::types::{CompletionOptions, Message, MessageRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_GLM_ENDPOINT: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const DEFAULT_GLM_MODEL: &str = "glm-4-plus";
pub const DEFAULT_GLM_FAST_MODEL: &str = "glm-4-flash";

/// GLM provider.
pub struct GlmProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    fast_model: String,
}

impl GlmProvider {
    /// Create a new GLM provider.
    ///
    /// An empty `base_url` or `api_key` leaves the provider configured but
    /// unavailable; `is_available` reports that to the selector.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        fast_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            fast_model: fast_model.into(),
        }
    }

    fn to_glm_messages(messages: &[Message]) -> Vec<GlmMessage> {
        messages.iter().map(|m| m.into()).collect()
    }
}

#[async_trait]
impl LlmProvider for GlmProvider {
    fn name(&self) -> &str {
        "glm"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let model = if options.prefer_fast_model {
            &self.fast_model
        } else {
            &self.model
        };

        let request = GlmChatRequest {
            model: model.clone(),
            messages: Self::to_glm_messages(messages),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
        };

        debug!(
            model = %model,
            message_count = messages.len(),
            "Sending completion request to GLM"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    LlmError::Timeout
                } else {
                    LlmError::GenerationFailed(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        match status {
            401 | 403 => return Err(LlmError::AuthFailed),
            429 => return Err(LlmError::RateLimited),
            s if !(200..300).contains(&s) => {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::GenerationFailed(format!(
                    "GLM answered status {}: {}",
                    s, body
                )));
            }
            _ => {}
        }

        let parsed: GlmChatResponse = response.json().await.map_err(|e| {
            LlmError::GenerationFailed(format!("failed to parse GLM response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::GenerationFailed("no choices in GLM response".to_string()))?;

        debug!(model = %model, "Received completion response from GLM");

        Ok(choice.message.content.unwrap_or_default())
    }
}

// GLM API types

#[derive(Debug, Serialize)]
struct GlmChatRequest {
    model: String,
    messages: Vec<GlmMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GlmMessage {
    role: String,
    content: String,
}

impl From<&Message> for GlmMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        GlmMessage {
            role: role.to_string(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GlmChatResponse {
    choices: Vec<GlmChoice>,
}

#[derive(Debug, Deserialize)]
struct GlmChoice {
    message: GlmResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GlmResponseMessage {
    content: Option<String>,
}
