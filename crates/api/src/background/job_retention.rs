//! Periodic eviction of finished analysis jobs.
//!
//! Removes terminal jobs whose `completed_at` is older than the configured
//! age from the registry and deletes their archive, extracted tree and
//! result document. Runs on a fixed interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use codearch_core::registry::JobRegistry;
use codearch_core::types::Timestamp;
use codearch_core::workspace::Workspace;
use tokio_util::sync::CancellationToken;

/// Run the retention loop until `cancel` is triggered.
pub async fn run(
    registry: Arc<JobRegistry>,
    workspace: Arc<Workspace>,
    max_age_hours: i64,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        max_age_hours,
        interval_secs = interval.as_secs(),
        "Job retention task started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = ticker.tick() => {
                let Some(before) = cutoff(Utc::now(), max_age_hours) else {
                    tracing::error!(max_age_hours, "Job retention: age out of range, skipping sweep");
                    continue;
                };
                let evicted = sweep(&registry, &workspace, before).await;
                if evicted > 0 {
                    tracing::info!(evicted, "Job retention: evicted finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to evict");
                }
            }
        }
    }
}

/// The instant `max_age_hours` before `now`, or `None` if it is not representable.
pub fn cutoff(now: Timestamp, max_age_hours: i64) -> Option<Timestamp> {
    chrono::TimeDelta::try_hours(max_age_hours).and_then(|age| now.checked_sub_signed(age))
}

/// Evict every terminal job that finished before `cutoff`.
///
/// Returns the number of jobs removed from the registry. File deletion
/// failures are logged and do not keep the job in the registry.
pub async fn sweep(registry: &JobRegistry, workspace: &Workspace, cutoff: Timestamp) -> usize {
    let mut evicted = 0;

    for job in registry.expired(cutoff).await {
        if registry.remove(job.id).await.is_none() {
            continue;
        }
        evicted += 1;

        if let Err(e) = workspace.purge(&job).await {
            tracing::error!(job_id = %job.id, error = %e, "Job retention: failed to delete files");
        }
    }

    evicted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
