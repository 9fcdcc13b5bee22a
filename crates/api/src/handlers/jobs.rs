//! Read-only job endpoints: status polling and result retrieval.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use codearch_core::error::CoreError;
use codearch_core::job::{Job, JobStatus};
use codearch_core::report::{self, AnalysisResult};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Look up a job by its raw path segment.
///
/// Anything that is not a UUID cannot name a job, so it is reported as
/// not found rather than as a malformed request.
async fn find_job(state: &AppState, raw_id: &str) -> AppResult<Arc<Job>> {
    match uuid::Uuid::parse_str(raw_id) {
        Ok(id) => Ok(state.registry.get(id).await?),
        Err(_) => Err(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: raw_id.to_string(),
        })),
    }
}

/// GET /api/job/{id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Job>> {
    let job = find_job(&state, &id).await?;
    Ok(Json(Job::clone(&job)))
}

/// GET /api/result/{id}
///
/// Serves the result document of a completed job, stamped with the job id.
/// Failed and unfinished jobs are reported as client errors; a completed job
/// whose document cannot be loaded is a server error.
pub async fn get_analysis_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AnalysisResult>> {
    let job = find_job(&state, &id).await?;

    match job.status {
        JobStatus::Failed => {
            let error = job.error.clone().unwrap_or_default();
            tracing::debug!(job_id = %job.id, %error, "Result requested for failed job");
            Err(AppError::AnalysisFailed(error))
        }
        JobStatus::Pending | JobStatus::Processing => Err(AppError::NotReady(job.status)),
        JobStatus::Completed => {
            let path = job.result_path.as_deref().ok_or_else(|| {
                AppError::ResultUnavailable("No result path available".to_string())
            })?;

            let mut result = report::read_report(path).await.map_err(|e| {
                AppError::ResultUnavailable(format!("Failed to load result: {e}"))
            })?;
            result.job_id = job.id.to_string();

            Ok(Json(result))
        }
    }
}
