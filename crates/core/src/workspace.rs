//! On-disk layout for job artifacts.
//!
//! ```text
//! <uploads_dir>/<job_id>.zip          uploaded archive
//! <uploads_dir>/<job_id>_extracted/   extracted source tree
//! <results_dir>/<job_id>.json         analyzer result document
//! ```
//!
//! Every path embeds the job id, so concurrent jobs never share files.

use std::io;
use std::path::{Path, PathBuf};

use crate::job::Job;
use crate::types::JobId;

#[derive(Debug, Clone)]
pub struct Workspace {
    uploads_dir: PathBuf,
    results_dir: PathBuf,
}

impl Workspace {
    pub fn new(uploads_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            results_dir: results_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Create the uploads and results directories if they do not exist.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        tokio::fs::create_dir_all(&self.results_dir).await
    }

    pub fn upload_path(&self, id: JobId) -> PathBuf {
        self.uploads_dir.join(format!("{id}.zip"))
    }

    pub fn extract_dir(&self, id: JobId) -> PathBuf {
        self.uploads_dir.join(format!("{id}_extracted"))
    }

    pub fn result_path(&self, id: JobId) -> PathBuf {
        self.results_dir.join(format!("{id}.json"))
    }

    /// Delete every artifact belonging to `job`. Already-missing files are
    /// not an error.
    pub async fn purge(&self, job: &Job) -> io::Result<()> {
        ignore_missing(tokio::fs::remove_file(&job.upload_path).await)?;
        ignore_missing(tokio::fs::remove_dir_all(self.extract_dir(job.id)).await)?;
        let result_path = job
            .result_path
            .clone()
            .unwrap_or_else(|| self.result_path(job.id));
        ignore_missing(tokio::fs::remove_file(result_path).await)
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
