pub mod analysis;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// POST   /analyze          upload archive, start analysis (multipart)
/// GET    /job/{id}         job status
/// GET    /result/{id}      result document
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    analysis::router(max_upload_bytes)
}
