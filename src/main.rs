use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use songforge_server::config::{self, AppConfig};
use songforge_server::llm::{GlmProvider, JoyBuilderProvider, LlmProvider};
use songforge_server::orchestrator::Orchestrator;
use songforge_server::registry::TrackRegistry;
use songforge_server::render::{MusicRenderer, SunoClient};
use songforge_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use songforge_server::server::state::ServerState;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Treat the host as inside the corporate network (JoyBuilder reachable).
    #[clap(long, default_value_t = false)]
    pub internal_network: bool,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            logging_level: args.logging_level.clone(),
            internal_network: args.internal_network,
            frontend_dir_path: args.frontend_dir_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  internal_network: {}", app_config.internal_network);

    // LLM providers: construction always succeeds, availability is what
    // gates selection.
    let glm = Arc::new(GlmProvider::new(
        app_config.glm.endpoint.clone(),
        app_config.glm.api_key.clone(),
        app_config.glm.model.clone(),
        app_config.glm.fast_model.clone(),
    ));
    let joybuilder = Arc::new(JoyBuilderProvider::new(
        app_config.joybuilder.endpoint.clone(),
        app_config.joybuilder.api_key.clone(),
        app_config.joybuilder.app_id.clone(),
        app_config.joybuilder.model.clone(),
    ));
    info!(
        "LLM providers: glm available={}, joybuilder available={}",
        glm.is_available(),
        joybuilder.is_available()
    );

    // Rendering gateway is optional; without it the rendering routes
    // answer 503.
    let renderer: Option<Arc<dyn MusicRenderer>> = match &app_config.suno {
        Some(suno) => {
            info!("Rendering gateway configured at {}", suno.endpoint);
            Some(Arc::new(SunoClient::new(
                suno.endpoint.clone(),
                suno.api_key.clone(),
                suno.timeout_sec,
                suno.default_model.clone(),
            )))
        }
        None => {
            info!("No rendering gateway configured, rendering routes disabled");
            None
        }
    };

    let registry = Arc::new(TrackRegistry::new());

    let orchestrator = Arc::new(Orchestrator::new(
        Some(glm.clone() as Arc<dyn LlmProvider>),
        Some(joybuilder.clone() as Arc<dyn LlmProvider>),
        renderer.clone(),
        registry.clone(),
        app_config.internal_network,
        app_config.style_defaults.clone(),
    ));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        wait_poll_interval_ms: app_config
            .suno
            .as_ref()
            .map(|s| s.poll_interval_ms)
            .unwrap_or(3_000),
        wait_max_ms: app_config
            .suno
            .as_ref()
            .map(|s| s.max_wait_ms)
            .unwrap_or(300_000),
        frontend_dir_path: app_config.frontend_dir_path.clone(),
    };

    let state = ServerState {
        config: server_config,
        orchestrator,
        registry,
        renderer,
    };

    let shutdown_token = CancellationToken::new();

    info!("Ready to serve at port {}!", app_config.port);

    tokio::select! {
        result = run_server(state, app_config.port, shutdown_token.child_token()) => {
            info!("HTTP server stopped: {:?}", result);
            shutdown_token.cancel();
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            // Give in-flight requests a moment to complete
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            Ok(())
        }
    }
}
