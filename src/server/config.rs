//! Server-side configuration handed to the HTTP layer.

use super::http_layers::RequestsLoggingLevel;
use crate::render::{DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    /// Poll interval used by the blocking wait route.
    pub wait_poll_interval_ms: u64,
    /// Upper bound for the wait route; caller-supplied budgets are capped
    /// here.
    pub wait_max_ms: u64,
    /// Directory with the built frontend, statically served when set.
    pub frontend_dir_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            requests_logging_level: RequestsLoggingLevel::Path,
            wait_poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            wait_max_ms: DEFAULT_MAX_WAIT.as_millis() as u64,
            frontend_dir_path: None,
        }
    }
}
