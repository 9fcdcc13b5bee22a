//! In-memory job registry.
//!
//! Each record is stored as an `Arc<Job>` snapshot. Updates build a complete
//! replacement snapshot via [`Job::apply`] and swap the pointer while holding
//! the write lock; readers clone the `Arc` under a short read lock. The lock
//! is never held across I/O.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::job::{Job, JobTransition};
use crate::types::{JobId, Timestamp};

/// Process-lifetime store of analysis jobs.
///
/// Designed to be wrapped in `Arc` and shared between request handlers and
/// background tasks.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Job>>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new job. Fails with [`CoreError::Conflict`] if the id is taken.
    pub async fn create(&self, job: Job) -> Result<Arc<Job>, CoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.entry(job.id) {
            Entry::Occupied(_) => Err(CoreError::Conflict(format!(
                "job {} already exists",
                job.id
            ))),
            Entry::Vacant(slot) => Ok(Arc::clone(slot.insert(Arc::new(job)))),
        }
    }

    /// Fetch the current snapshot of a job.
    pub async fn get(&self, id: JobId) -> Result<Arc<Job>, CoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Job",
                id: id.to_string(),
            })
    }

    /// Apply `transition` to the job and publish the resulting snapshot.
    ///
    /// On error the stored snapshot is unchanged.
    pub async fn update_status(
        &self,
        id: JobId,
        transition: JobTransition,
    ) -> Result<Arc<Job>, CoreError> {
        let mut jobs = self.jobs.write().await;
        let current = jobs
            .get(&id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Job",
                id: id.to_string(),
            })?;
        let next = Arc::new(current.apply(transition)?);
        jobs.insert(id, Arc::clone(&next));
        Ok(next)
    }

    /// Drop a job from the registry, returning its last snapshot.
    pub async fn remove(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.write().await.remove(&id)
    }

    /// Terminal jobs that finished before `cutoff`.
    pub async fn expired(&self, cutoff: Timestamp) -> Vec<Arc<Job>> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.status.is_terminal())
            .filter(|job| job.completed_at.is_some_and(|at| at < cutoff))
            .cloned()
            .collect()
    }

    /// Number of tracked jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
