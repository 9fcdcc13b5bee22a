//! Failure causes of a background analysis run.
//!
//! Each variant's `Display` text becomes the `error` field of a failed job.

use std::path::PathBuf;

use crate::archive::ArchiveError;
use crate::report::ReportError;
use crate::tool::ToolError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The uploaded archive could not be unpacked.
    #[error("Failed to extract ZIP file: {0}")]
    Extraction(#[from] ArchiveError),

    /// The analyzer could not be started or exited unsuccessfully.
    #[error("Analysis failed: {0}")]
    ToolInvocation(ToolError),

    /// The analyzer ran past its deadline and was killed.
    #[error("Analysis timed out after {limit_secs}s")]
    TimedOut { limit_secs: u64 },

    /// The analyzer exited cleanly but wrote nothing.
    #[error("Result file was not generated: {}", .0.display())]
    ResultMissing(PathBuf),

    /// The analyzer wrote something that is not a result document.
    #[error("Result file could not be parsed: {0}")]
    ResultParse(ReportError),
}

impl AnalysisError {
    /// Stable short name of the failure cause, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extraction",
            Self::ToolInvocation(_) => "tool_invocation",
            Self::TimedOut { .. } => "timed_out",
            Self::ResultMissing(_) => "result_missing",
            Self::ResultParse(_) => "result_parse",
        }
    }
}
