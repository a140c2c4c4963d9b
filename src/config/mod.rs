mod file_config;

pub use file_config::{DefaultsConfig, FileConfig, GlmConfig, JoyBuilderConfig, SunoConfig};

use crate::llm::glm::{DEFAULT_GLM_ENDPOINT, DEFAULT_GLM_FAST_MODEL, DEFAULT_GLM_MODEL};
use crate::llm::joybuilder::DEFAULT_JOYBUILDER_MODEL;
use crate::orchestrator::StyleDefaults;
use crate::server::RequestsLoggingLevel;
use anyhow::Result;
use clap::ValueEnum;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub internal_network: bool,
    pub frontend_dir_path: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            internal_network: false,
            frontend_dir_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// Whether the process runs inside the corporate network, where the
    /// JoyBuilder gateway is reachable. Feeds provider selection.
    pub internal_network: bool,
    pub frontend_dir_path: Option<String>,

    pub glm: GlmSettings,
    pub joybuilder: JoyBuilderSettings,
    /// Rendering gateway; `None` leaves every rendering route disabled.
    pub suno: Option<SunoSettings>,
    pub style_defaults: StyleDefaults,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let internal_network = file.internal_network.unwrap_or(cli.internal_network);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let glm_file = file.glm.unwrap_or_default();
        let glm = GlmSettings {
            endpoint: glm_file
                .endpoint
                .unwrap_or_else(|| DEFAULT_GLM_ENDPOINT.to_string()),
            api_key: glm_file.api_key.unwrap_or_default(),
            model: glm_file
                .model
                .unwrap_or_else(|| DEFAULT_GLM_MODEL.to_string()),
            fast_model: glm_file
                .fast_model
                .unwrap_or_else(|| DEFAULT_GLM_FAST_MODEL.to_string()),
        };

        let joy_file = file.joybuilder.unwrap_or_default();
        let joybuilder = JoyBuilderSettings {
            // No default endpoint: the gateway address is deployment-specific.
            endpoint: joy_file.endpoint.unwrap_or_default(),
            api_key: joy_file.api_key.unwrap_or_default(),
            app_id: joy_file.app_id.unwrap_or_else(|| "songforge".to_string()),
            model: joy_file
                .model
                .unwrap_or_else(|| DEFAULT_JOYBUILDER_MODEL.to_string()),
        };

        // Rendering is only wired up when the gateway endpoint is known.
        let suno = file.suno.and_then(|s| {
            let endpoint = s.endpoint?;
            Some(SunoSettings {
                endpoint,
                api_key: s.api_key.unwrap_or_default(),
                default_model: s.default_model.unwrap_or_else(|| "v3.5".to_string()),
                timeout_sec: s.timeout_sec.unwrap_or(60),
                poll_interval_ms: s.poll_interval_ms.unwrap_or(3_000),
                max_wait_ms: s.max_wait_ms.unwrap_or(300_000),
            })
        });

        let defaults_file = file.defaults.unwrap_or_default();
        let style_fallback = StyleDefaults::default();
        let style_defaults = StyleDefaults {
            tags: defaults_file.tags.unwrap_or(style_fallback.tags),
            mood: defaults_file.mood.unwrap_or(style_fallback.mood),
        };

        Ok(Self {
            port,
            logging_level,
            internal_network,
            frontend_dir_path,
            glm,
            joybuilder,
            suno,
            style_defaults,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GlmSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub fast_model: String,
}

#[derive(Debug, Clone)]
pub struct JoyBuilderSettings {
    pub endpoint: String,
    pub api_key: String,
    pub app_id: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SunoSettings {
    pub endpoint: String,
    pub api_key: String,
    pub default_model: String,
    pub timeout_sec: u64,
    pub poll_interval_ms: u64,
    pub max_wait_ms: u64,
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("path"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            port: 3005,
            logging_level: RequestsLoggingLevel::Headers,
            internal_network: true,
            frontend_dir_path: Some("/frontend".to_string()),
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.port, 3005);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert!(config.internal_network);
        assert_eq!(config.frontend_dir_path.as_deref(), Some("/frontend"));
        // GLM defaults apply, but with no key it is simply unconfigured.
        assert_eq!(config.glm.endpoint, DEFAULT_GLM_ENDPOINT);
        assert!(config.glm.api_key.is_empty());
        // No suno table, no renderer.
        assert!(config.suno.is_none());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            port: 3001,
            ..Default::default()
        };
        let file = FileConfig {
            port: Some(4000),
            logging_level: Some("body".to_string()),
            internal_network: Some(true),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert!(config.internal_network);
    }

    #[test]
    fn test_resolve_suno_requires_endpoint() {
        let file = FileConfig {
            suno: Some(SunoConfig {
                api_key: Some("key".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();
        assert!(config.suno.is_none());

        let file = FileConfig {
            suno: Some(SunoConfig {
                endpoint: Some("https://suno-gw.example.com".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();
        let suno = config.suno.unwrap();
        assert_eq!(suno.default_model, "v3.5");
        assert_eq!(suno.poll_interval_ms, 3_000);
        assert_eq!(suno.max_wait_ms, 300_000);
    }

    #[test]
    fn test_resolve_style_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();
        assert_eq!(config.style_defaults.tags, vec!["pop", "melodic"]);

        let file = FileConfig {
            defaults: Some(DefaultsConfig {
                tags: Some(vec!["citypop".to_string()]),
                mood: Some("nostalgic".to_string()),
            }),
            ..Default::default()
        };
        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();
        assert_eq!(config.style_defaults.tags, vec!["citypop"]);
        assert_eq!(config.style_defaults.mood, "nostalgic");
    }
}
