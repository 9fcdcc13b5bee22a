//! One background task per accepted job.
//!
//! The runner moves a job to `Processing`, hands the snapshot to
//! [`pipeline::analyze`], and publishes the terminal state in a single
//! registry update. Failures are recorded on the job; they never propagate
//! out of the task or affect other jobs.

use std::sync::Arc;
use std::time::Duration;

use codearch_core::job::{JobStatus, JobTransition};
use codearch_core::registry::JobRegistry;
use codearch_core::tool::AnalyzerCommand;
use codearch_core::types::JobId;
use codearch_core::workspace::Workspace;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use super::pipeline;

/// Schedules and drives analysis jobs.
///
/// Cheaply cloneable; all clones share the same task tracker.
#[derive(Clone)]
pub struct JobRunner {
    registry: Arc<JobRegistry>,
    workspace: Arc<Workspace>,
    analyzer: Arc<AnalyzerCommand>,
    tracker: TaskTracker,
}

impl JobRunner {
    pub fn new(
        registry: Arc<JobRegistry>,
        workspace: Arc<Workspace>,
        analyzer: Arc<AnalyzerCommand>,
    ) -> Self {
        Self {
            registry,
            workspace,
            analyzer,
            tracker: TaskTracker::new(),
        }
    }

    /// Start the background task for `job_id` without waiting for it.
    pub fn spawn(&self, job_id: JobId) -> JoinHandle<()> {
        let runner = self.clone();
        self.tracker.spawn(async move { runner.run(job_id).await })
    }

    /// Drive `job_id` from `Pending` to a terminal state.
    pub async fn run(&self, job_id: JobId) {
        let job = match self
            .registry
            .update_status(job_id, JobTransition::Start)
            .await
        {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Cannot start analysis job");
                return;
            }
        };
        tracing::info!(%job_id, "Starting analysis");

        let transition = match pipeline::analyze(&job, &self.workspace, &self.analyzer).await {
            Ok(result_path) => JobTransition::Complete { result_path },
            Err(e) => {
                tracing::warn!(%job_id, kind = e.kind(), error = %e, "Analysis failed");
                JobTransition::Fail {
                    error: e.to_string(),
                }
            }
        };

        match self.registry.update_status(job_id, transition).await {
            Ok(job) if job.status == JobStatus::Completed => {
                tracing::info!(%job_id, "Analysis completed");
            }
            Ok(job) => {
                tracing::info!(%job_id, status = %job.status, "Analysis finished");
            }
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Failed to publish analysis outcome");
            }
        }
    }

    /// Number of analysis tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait up to `timeout` for running jobs.
    /// Returns `true` if every job finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
