//! Per-job analysis steps: extract, invoke, interpret.

use std::path::PathBuf;

use codearch_core::analysis::AnalysisError;
use codearch_core::archive;
use codearch_core::job::Job;
use codearch_core::report::{self, ReportError};
use codearch_core::tool::{AnalyzerCommand, ToolError};
use codearch_core::workspace::Workspace;

/// Run the analyzer over `job`'s archive and return the result document path.
///
/// Reads only the immutable job snapshot; the caller publishes the outcome.
pub async fn analyze(
    job: &Job,
    workspace: &Workspace,
    analyzer: &AnalyzerCommand,
) -> Result<PathBuf, AnalysisError> {
    let extract_dir = workspace.extract_dir(job.id);
    let result_path = workspace.result_path(job.id);

    let file_count = archive::extract_zip(&job.upload_path, &extract_dir).await?;
    tracing::debug!(job_id = %job.id, file_count, "Archive extracted");

    let output = analyzer
        .run(&extract_dir, &result_path)
        .await
        .map_err(|e| match e {
            ToolError::Timeout { .. } => AnalysisError::TimedOut {
                limit_secs: analyzer.timeout.as_secs(),
            },
            other => AnalysisError::ToolInvocation(other),
        })?;
    tracing::debug!(
        job_id = %job.id,
        duration_ms = output.duration_ms,
        "Analyzer exited successfully",
    );

    match report::read_report(&result_path).await {
        Ok(_) => {}
        Err(ReportError::Missing(path)) => return Err(AnalysisError::ResultMissing(path)),
        Err(e) => return Err(AnalysisError::ResultParse(e)),
    }

    if let Err(e) = report::inject_job_id(&result_path, job.id).await {
        tracing::warn!(job_id = %job.id, error = %e, "Failed to write job id into result");
    }

    Ok(result_path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
