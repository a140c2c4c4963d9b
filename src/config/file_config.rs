//! TOML file configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Raw TOML configuration. Every field is optional; resolution against
/// CLI arguments and defaults happens in `AppConfig::resolve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub internal_network: Option<bool>,
    pub frontend_dir_path: Option<String>,
    pub glm: Option<GlmConfig>,
    pub joybuilder: Option<JoyBuilderConfig>,
    pub suno: Option<SunoConfig>,
    pub defaults: Option<DefaultsConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

/// `[glm]` table: the public chat-completion provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlmConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub fast_model: Option<String>,
}

/// `[joybuilder]` table: the internal gateway provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoyBuilderConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub app_id: Option<String>,
    pub model: Option<String>,
}

/// `[suno]` table: the music rendering gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SunoConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub default_model: Option<String>,
    pub timeout_sec: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_wait_ms: Option<u64>,
}

/// `[defaults]` table: style fallback when recommendation fails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
    pub tags: Option<Vec<String>>,
    pub mood: Option<String>,
}
