use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use codearch_core::error::CoreError;
use codearch_core::job::JobStatus;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `codearch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The upload request carried no archive.
    #[error("No file uploaded")]
    NoFile,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Reading or writing job artifacts failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The result was requested before the job reached a terminal state.
    #[error("Analysis not completed yet (status: {0})")]
    NotReady(JobStatus),

    /// The job failed; carries the stored error.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// The job is completed but its result document cannot be served.
    #[error("Result unavailable: {0}")]
    ResultUnavailable(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<String> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::InvalidTransition { .. } => {
                    tracing::error!(error = %core, "Invalid job transition");
                    (
                        StatusCode::CONFLICT,
                        "INVALID_TRANSITION",
                        core.to_string(),
                    )
                }
            },

            // --- Job lifecycle ---
            AppError::NoFile => (
                StatusCode::BAD_REQUEST,
                "NO_FILE",
                "No file uploaded".to_string(),
            ),
            AppError::NotReady(status) => {
                details = Some(format!("Job status: {status}"));
                (
                    StatusCode::BAD_REQUEST,
                    "NOT_READY",
                    "Analysis not completed yet".to_string(),
                )
            }
            AppError::AnalysisFailed(error) => {
                details = Some(error.clone());
                (
                    StatusCode::BAD_REQUEST,
                    "ANALYSIS_FAILED",
                    "Analysis failed".to_string(),
                )
            }
            AppError::ResultUnavailable(msg) => {
                tracing::error!(error = %msg, "Completed job has no readable result");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RESULT_UNAVAILABLE",
                    msg.clone(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to save file".to_string(),
                )
            }
        };

        let body = match details {
            Some(details) => json!({
                "error": message,
                "code": code,
                "details": details,
            }),
            None => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
