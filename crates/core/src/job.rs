//! Analysis job record and its lifecycle state machine.
//!
//! A [`Job`] is an immutable snapshot. Every state change goes through
//! [`Job::apply`], which validates the move and returns a complete new
//! snapshot, leaving the original untouched. The registry publishes the new
//! snapshot in one pointer swap, so readers never see a half-applied update.
//!
//! ```text
//! Pending ──Start──> Processing ──Complete──> Completed
//!                         │
//!                         └──────Fail───────> Failed
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Lifecycle status of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted and persisted; background work not yet started.
    Pending,
    /// The background task is extracting or analyzing.
    Processing,
    /// Result document is on disk and ready to serve.
    Completed,
    /// Analysis stopped with an error. Final.
    Failed,
}

impl JobStatus {
    /// Wire name, as used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `Completed` and `Failed` never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested state change, carrying the fields the target state needs.
#[derive(Debug, Clone, PartialEq)]
pub enum JobTransition {
    /// `Pending -> Processing`.
    Start,
    /// `Processing -> Completed`.
    Complete { result_path: PathBuf },
    /// `Processing -> Failed`.
    Fail { error: String },
}

impl JobTransition {
    /// The status this transition moves a job into.
    pub fn target(&self) -> JobStatus {
        match self {
            Self::Start => JobStatus::Processing,
            Self::Complete { .. } => JobStatus::Completed,
            Self::Fail { .. } => JobStatus::Failed,
        }
    }
}

/// One tracked unit of asynchronous analysis work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub upload_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PathBuf>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a `Pending` job for an archive already persisted at `upload_path`.
    pub fn new(id: JobId, upload_path: PathBuf) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            upload_path,
            result_path: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Compute the snapshot that results from applying `transition`.
    ///
    /// Returns [`CoreError::InvalidTransition`] for moves the state machine
    /// does not allow (including any move out of a terminal state), and
    /// [`CoreError::Validation`] when a terminal transition is missing the
    /// field its state requires.
    pub fn apply(&self, transition: JobTransition) -> Result<Job, CoreError> {
        let from = self.status;
        let to = transition.target();
        let invalid = || CoreError::InvalidTransition { from, to };

        let now = chrono::Utc::now();
        let mut next = self.clone();
        next.status = to;

        match transition {
            JobTransition::Start => {
                if from != JobStatus::Pending {
                    return Err(invalid());
                }
                next.started_at = Some(now);
            }
            JobTransition::Complete { result_path } => {
                if from != JobStatus::Processing {
                    return Err(invalid());
                }
                if result_path.as_os_str().is_empty() {
                    return Err(CoreError::Validation(
                        "completed job requires a result path".to_string(),
                    ));
                }
                next.result_path = Some(result_path);
                next.completed_at = Some(now);
            }
            JobTransition::Fail { error } => {
                if from != JobStatus::Processing {
                    return Err(invalid());
                }
                if error.trim().is_empty() {
                    return Err(CoreError::Validation(
                        "failed job requires an error message".to_string(),
                    ));
                }
                next.error = Some(error);
                next.completed_at = Some(now);
            }
        }

        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
