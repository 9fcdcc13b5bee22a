//! Intake endpoint: accept an archive and schedule its analysis.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use codearch_core::job::{Job, JobStatus};
use codearch_core::types::JobId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field carrying the uploaded archive.
pub const UPLOAD_FIELD: &str = "codebase";

/// Response for an accepted upload.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: String,
}

/// POST /api/analyze
///
/// Persist the uploaded archive, register a `Pending` job, and start the
/// analysis in the background. Returns immediately with the job id.
pub async fn upload_and_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let mut archive = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if !data.is_empty() {
            archive = Some(data);
        }
        break;
    }

    let data = archive.ok_or(AppError::NoFile)?;

    let job_id = uuid::Uuid::new_v4();
    let job = store_upload(&state, job_id, &data).await?;
    state.runner.spawn(job_id);

    tracing::info!(%job_id, size_bytes = data.len(), "Upload accepted, analysis scheduled");

    Ok(Json(AnalyzeResponse {
        job_id,
        status: job.status,
        message: format!("Analysis started. Check /api/job/{job_id} for status."),
    }))
}

/// Write the archive for `job_id` and register its `Pending` job.
///
/// The archive is removed again if the job cannot be registered.
async fn store_upload(state: &AppState, job_id: JobId, data: &[u8]) -> AppResult<Arc<Job>> {
    let upload_path = state.workspace.upload_path(job_id);
    tokio::fs::write(&upload_path, data).await.map_err(|e| {
        AppError::Storage(format!("writing {}: {e}", upload_path.display()))
    })?;

    match state.registry.create(Job::new(job_id, upload_path.clone())).await {
        Ok(job) => Ok(job),
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&upload_path).await {
                tracing::warn!(%job_id, error = %rm, "Failed to remove orphaned upload");
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use codearch_core::error::CoreError;

    use super::*;
    use crate::config::{AnalyzerConfig, RetentionConfig, ServerConfig};

    fn state(root: &std::path::Path) -> AppState {
        let state = AppState::new(ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec!["*".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            uploads_dir: root.join("uploads"),
            results_dir: root.join("results"),
            static_dir: root.join("static"),
            max_upload_bytes: 1024,
            analyzer: AnalyzerConfig {
                program: "true".into(),
                args: Vec::new(),
                timeout_secs: 5,
            },
            retention: RetentionConfig {
                max_age_hours: None,
                interval_secs: 3600,
            },
        });
        std::fs::create_dir_all(state.workspace.uploads_dir()).unwrap();
        state
    }

    #[tokio::test]
    async fn store_upload_registers_pending_job() {
        let root = tempfile::tempdir().unwrap();
        let state = state(root.path());
        let id = uuid::Uuid::new_v4();

        let job = store_upload(&state, id, b"PK").await.unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(std::fs::read(state.workspace.upload_path(id)).unwrap(), b"PK");
    }

    #[tokio::test]
    async fn store_upload_removes_archive_when_registration_fails() {
        let root = tempfile::tempdir().unwrap();
        let state = state(root.path());
        let id = uuid::Uuid::new_v4();
        state
            .registry
            .create(Job::new(id, root.path().join("elsewhere.zip")))
            .await
            .unwrap();

        let err = store_upload(&state, id, b"PK").await.unwrap_err();

        assert!(matches!(err, AppError::Core(CoreError::Conflict(_))));
        assert!(!state.workspace.upload_path(id).exists());
        assert_eq!(state.registry.len().await, 1);
    }
}
