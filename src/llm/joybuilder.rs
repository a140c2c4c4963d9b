//! JoyBuilder chat-completion provider.
//!
//! JoyBuilder is the company-internal LLM gateway, reachable only from the
//! internal network. The wire shape is chat-completions compatible but the
//! gateway additionally requires an application id header on every call.

use super::provider::{LlmError, LlmProvider};
use super::types::{CompletionOptions, Message, MessageRole};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_JOYBUILDER_MODEL: &str = "joybuilder-pro";

const APP_ID_HEADER: &str = "X-App-Id";

/// JoyBuilder provider.
pub struct JoyBuilderProvider {
    client: Client,
    base_url: String,
    api_key: String,
    app_id: String,
    model: String,
}

impl JoyBuilderProvider {
    /// Create a new JoyBuilder provider.
    ///
    /// There is no default endpoint: the gateway address comes from
    /// deployment configuration and its absence simply makes the provider
    /// unavailable.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        app_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            app_id: app_id.into(),
            model: model.into(),
        }
    }

    fn to_gateway_messages(messages: &[Message]) -> Vec<JoyMessage> {
        messages.iter().map(|m| m.into()).collect()
    }
}

#[async_trait]
impl LlmProvider for JoyBuilderProvider {
    fn name(&self) -> &str {
        "joybuilder"
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

        let request = JoyChatRequest {
            model: self.model.clone(),
            messages: Self::to_gateway_messages(messages),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
            stream: false,
        };

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending completion request to JoyBuilder gateway"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(APP_ID_HEADER, &self.app_id)
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
                    "JoyBuilder gateway answered status {}: {}",
                    s, body
                )));
            }
            _ => {}
        }

        let parsed: JoyChatResponse = response.json().await.map_err(|e| {
            LlmError::GenerationFailed(format!("failed to parse JoyBuilder response: {}", e))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            LlmError::GenerationFailed("no choices in JoyBuilder response".to_string())
        })?;

        debug!(model = %self.model, "Received completion response from JoyBuilder gateway");

        Ok(choice.message.content.unwrap_or_default())
    }
}

// JoyBuilder gateway API types

#[derive(Debug, Serialize)]
struct JoyChatRequest {
    model: String,
    messages: Vec<JoyMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct JoyMessage {
    role: String,
    content: String,
}

impl From<&Message> for JoyMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        JoyMessage {
            role: role.to_string(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JoyChatResponse {
    choices: Vec<JoyChoice>,
}

#[derive(Debug, Deserialize)]
struct JoyChoice {
    message: JoyResponseMessage,
}

#[derive(Debug, Deserialize)]
struct JoyResponseMessage {
    content: Option<String>,
}
