//! Route definitions for analysis jobs.
//!
//! Mounted at `/api`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analyze, jobs};
use crate::state::AppState;

/// Routes mounted at `/api`.
///
/// ```text
/// POST   /analyze          -> upload_and_analyze  (multipart, body limit applies)
/// GET    /job/{id}         -> get_job_status
/// GET    /result/{id}      -> get_analysis_result
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/analyze",
            post(analyze::upload_and_analyze).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/job/{id}", get(jobs::get_job_status))
        .route("/result/{id}", get(jobs::get_analysis_result))
}
