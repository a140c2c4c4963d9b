//! Common types for LLM interactions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request timeout.
    pub timeout: Duration,
    /// Ask the provider for its fast/cheap model instead of the default.
    pub prefer_fast_model: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(2048),
            timeout: Duration::from_secs(60),
            prefer_fast_model: false,
        }
    }
}

impl CompletionOptions {
    /// Options tuned for short utility completions (prompt enhancement).
    pub fn fast() -> Self {
        Self {
            temperature: 0.5,
            max_tokens: Some(512),
            timeout: Duration::from_secs(30),
            prefer_fast_model: true,
        }
    }

    /// Options tuned for creative long-form output (lyrics).
    pub fn creative() -> Self {
        Self {
            temperature: 0.85,
            ..Self::default()
        }
    }
}
