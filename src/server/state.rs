use axum::extract::FromRef;

use super::ServerConfig;
use crate::orchestrator::Orchestrator;
use crate::registry::TrackRegistry;
use crate::render::MusicRenderer;
use std::sync::Arc;

pub type GuardedOrchestrator = Arc<Orchestrator>;
pub type GuardedTrackRegistry = Arc<TrackRegistry>;
pub type OptionalRenderer = Option<Arc<dyn MusicRenderer>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub orchestrator: GuardedOrchestrator,
    pub registry: GuardedTrackRegistry,
    pub renderer: OptionalRenderer,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.orchestrator.clone()
    }
}

impl FromRef<ServerState> for GuardedTrackRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.registry.clone()
    }
}

impl FromRef<ServerState> for OptionalRenderer {
    fn from_ref(input: &ServerState) -> Self {
        input.renderer.clone()
    }
}
