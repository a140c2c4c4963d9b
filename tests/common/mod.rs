//! Test server lifecycle management.
//!
//! Each test gets an isolated songforge server wired to a stub vendor app
//! that stands in for both the chat-completion endpoint and the rendering
//! gateway, everything bound to random localhost ports.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use songforge_server::config::{AppConfig, CliConfig, FileConfig, GlmConfig, SunoConfig};
use songforge_server::llm::{GlmProvider, JoyBuilderProvider, LlmProvider};
use songforge_server::orchestrator::Orchestrator;
use songforge_server::registry::TrackRegistry;
use songforge_server::render::{MusicRenderer, SunoClient};
use songforge_server::server::state::ServerState;
use songforge_server::server::{make_app, RequestsLoggingLevel, ServerConfig};

/// Shared state of the stub vendor.
pub struct VendorState {
    /// Every render submission payload, in order.
    pub submissions: Mutex<Vec<Value>>,
    /// Number of status queries answered so far.
    pub query_calls: AtomicUsize,
    /// Queries before a job reads as complete.
    pub complete_after: usize,
    next_task: AtomicUsize,
}

impl VendorState {
    fn new(complete_after: usize) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            query_calls: AtomicUsize::new(0),
            complete_after,
            next_task: AtomicUsize::new(1),
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

async fn chat_completions(Json(body): Json<Value>) -> Json<Value> {
    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();

    let content = if system.contains("songwriter") {
        // Chinese markers on purpose: the adapter must canonicalize them.
        let lyrics = "[主歌]\n沿着海边走\nsunlight on the water\n[副歌]\nsummer love, summer love\n[尾声]\nfading slow";
        format!(
            "```json\n{}\n```",
            json!({ "title": "Summer Love", "lyrics": lyrics })
        )
    } else if system.contains("producer") {
        json!({ "tags": ["pop", "summer", "pop"], "mood": "bright", "tempo": "upbeat" })
            .to_string()
    } else if system.contains("editor") {
        "[Verse]\npolished words\n[Chorus]\npolished hook".to_string()
    } else {
        format!("Enhanced: {}", user)
    };

    Json(json!({ "choices": [ { "message": { "content": content } } ] }))
}

async fn render_generate(
    State(vendor): State<Arc<VendorState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let task_id = format!("task-{}", vendor.next_task.fetch_add(1, Ordering::SeqCst));
    vendor.submissions.lock().unwrap().push(body);
    Json(json!({ "code": 200, "data": { "task_id": task_id } }))
}

async fn render_query(
    State(vendor): State<Arc<VendorState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let calls = vendor.query_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let status = if calls >= vendor.complete_after { 3 } else { 2 };

    let ids: Vec<String> = body["ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let jobs: Vec<Value> = ids
        .iter()
        .map(|id| {
            let mut job = json!({ "id": id, "status": status, "title": "Summer Love" });
            if status == 3 {
                job["audio_url"] = json!(format!("https://cdn.stub/{}.mp3", id));
                job["duration"] = json!(184.2);
            }
            job
        })
        .collect();

    Json(json!({ "code": 200, "data": jobs }))
}

async fn spawn_vendor(complete_after: usize) -> (String, Arc<VendorState>) {
    let vendor = Arc::new(VendorState::new(complete_after));

    let app = Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/v1/music/generate", post(render_generate))
        .route("/v1/music/query", post(render_query))
        .with_state(vendor.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind vendor stub");
    let addr = listener.local_addr().expect("Vendor stub has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Vendor stub died");
    });

    (format!("http://{}", addr), vendor)
}

/// Test server instance wired to the stub vendor.
pub struct TestServer {
    /// Base URL for making requests (e.g. "http://127.0.0.1:12345").
    pub base_url: String,
    pub vendor: Arc<VendorState>,
    client: reqwest::Client,
}

impl TestServer {
    /// Spawn a server with GLM and the rendering gateway pointed at the
    /// stub vendor. JoyBuilder stays unconfigured, so this is the
    /// external-network single-provider scenario.
    pub async fn spawn() -> Self {
        Self::spawn_inner(true, 2).await
    }

    /// Spawn a server with no rendering gateway configured.
    pub async fn spawn_without_renderer() -> Self {
        Self::spawn_inner(false, 2).await
    }

    async fn spawn_inner(with_renderer: bool, complete_after: usize) -> Self {
        let (vendor_url, vendor) = spawn_vendor(complete_after).await;

        let file = FileConfig {
            glm: Some(GlmConfig {
                endpoint: Some(vendor_url.clone()),
                api_key: Some("test-key".to_string()),
                ..Default::default()
            }),
            suno: with_renderer.then(|| SunoConfig {
                endpoint: Some(vendor_url.clone()),
                api_key: Some("test-key".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let app_config =
            AppConfig::resolve(&CliConfig::default(), Some(file)).expect("config resolution");

        let glm: Arc<dyn LlmProvider> = Arc::new(GlmProvider::new(
            app_config.glm.endpoint.clone(),
            app_config.glm.api_key.clone(),
            app_config.glm.model.clone(),
            app_config.glm.fast_model.clone(),
        ));
        // Unconfigured: empty endpoint and key make it unavailable.
        let joybuilder: Arc<dyn LlmProvider> = Arc::new(JoyBuilderProvider::new(
            app_config.joybuilder.endpoint.clone(),
            app_config.joybuilder.api_key.clone(),
            app_config.joybuilder.app_id.clone(),
            app_config.joybuilder.model.clone(),
        ));

        let renderer: Option<Arc<dyn MusicRenderer>> = app_config.suno.as_ref().map(|suno| {
            Arc::new(SunoClient::new(
                suno.endpoint.clone(),
                suno.api_key.clone(),
                suno.timeout_sec,
                suno.default_model.clone(),
            )) as Arc<dyn MusicRenderer>
        });

        let registry = Arc::new(TrackRegistry::new());
        let orchestrator = Arc::new(Orchestrator::new(
            Some(glm),
            Some(joybuilder),
            renderer.clone(),
            registry.clone(),
            app_config.internal_network,
            app_config.style_defaults.clone(),
        ));

        let state = ServerState {
            config: ServerConfig {
                requests_logging_level: RequestsLoggingLevel::None,
                // Tight budgets keep wait-route tests fast.
                wait_poll_interval_ms: 50,
                wait_max_ms: 5_000,
                frontend_dir_path: None,
            },
            orchestrator,
            registry,
            renderer,
        };

        let app = make_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Server has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server died");
        });

        Self {
            base_url: format!("http://{}", addr),
            vendor,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn patch(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request failed")
    }
}
