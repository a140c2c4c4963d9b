//! Music rendering via the Suno-compatible gateway.
//!
//! Rendering is asynchronous on the vendor side: a submission returns a
//! job id, and the job is polled until it reaches a terminal state.

pub mod client;
pub mod models;

pub use client::SunoClient;
pub use models::{RenderError, RenderJob, RenderSpec, RenderStatus};

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default overall wait budget for `wait_for_completion`.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(300_000);
/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Trait for the music rendering backend.
#[async_trait]
pub trait MusicRenderer: Send + Sync {
    /// Submit a rendering job, returning the vendor-assigned job id.
    async fn submit(&self, spec: RenderSpec) -> Result<String, RenderError>;

    /// Query the current state of one job.
    ///
    /// A vendor application-level error answer produces a `Failed` job,
    /// not an `Err`; only transport problems surface as errors.
    async fn query(&self, job_id: &str) -> Result<RenderJob, RenderError>;

    /// Query up to 50 jobs at once. More than 50 ids is rejected with
    /// `InvalidParams` before any network traffic.
    async fn query_batch(&self, job_ids: &[String]) -> Result<Vec<RenderJob>, RenderError>;

    /// Poll `query` every `poll_interval` until the job is terminal or
    /// `max_wait` has elapsed.
    ///
    /// Transient query errors are swallowed and retried; only a terminal
    /// job status ends the loop early, and exhausting the budget fails
    /// with `Timeout`.
    async fn wait_for_completion(
        &self,
        job_id: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<RenderJob, RenderError> {
        let deadline = tokio::time::Instant::now() + max_wait;

        loop {
            match self.query(job_id).await {
                Ok(job) if job.status.is_terminal() => return Ok(job),
                Ok(job) => {
                    debug!(job_id = %job_id, status = ?job.status, "Render job still in progress");
                }
                Err(e) => {
                    debug!(job_id = %job_id, error = %e, "Transient render query error, will retry");
                }
            }

            if tokio::time::Instant::now() + poll_interval > deadline {
                return Err(RenderError::Timeout);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
