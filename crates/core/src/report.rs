//! Result document written by the external analyzer.
//!
//! The service does not interpret findings. It only needs to load the
//! document to confirm it is well-formed and to stamp the job id into it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// Analysis output for one uploaded codebase.
///
/// Missing fields take their defaults and unknown fields are ignored, so
/// documents from older or newer analyzers still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub job_id: String,
    pub project_name: String,
    pub total_files: u64,
    pub total_lines: u64,
    pub languages: BTreeMap<String, u64>,
    pub complexity_score: f64,
    pub security_issues: Vec<SecurityIssue>,
    pub code_smells: Vec<CodeSmell>,
    pub business_logic: Vec<BusinessLogicPattern>,
    pub recommendations: Vec<String>,
    pub generated_at: String,
}

impl AnalysisResult {
    /// Total number of findings across all finding lists.
    pub fn finding_count(&self) -> usize {
        self.security_issues.len() + self.code_smells.len() + self.business_logic.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub file: String,
    pub line: u64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSmell {
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub line: u64,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessLogicPattern {
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub function: String,
    pub description: String,
    pub value: String,
}

/// Errors loading or patching a result document.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Result file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to access result file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse result JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Result document is not a JSON object")]
    NotAnObject,
}

/// Read and parse the result document at `path`.
///
/// The top level must be a JSON object; every modelled field is optional.
pub async fn read_report(path: &Path) -> Result<AnalysisResult, ReportError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReportError::Missing(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let doc: serde_json::Value = serde_json::from_slice(&bytes)?;
    if !doc.is_object() {
        return Err(ReportError::NotAnObject);
    }
    Ok(serde_json::from_value(doc)?)
}

/// Rewrite the `job_id` field of the document at `path` in place.
///
/// Works on the raw JSON object so fields this crate does not model are
/// preserved.
pub async fn inject_job_id(path: &Path, job_id: JobId) -> Result<(), ReportError> {
    let bytes = tokio::fs::read(path).await?;
    let mut doc: serde_json::Value = serde_json::from_slice(&bytes)?;
    let object = doc.as_object_mut().ok_or(ReportError::NotAnObject)?;
    object.insert(
        "job_id".to_string(),
        serde_json::Value::String(job_id.to_string()),
    );
    let updated = serde_json::to_vec_pretty(&doc)?;
    tokio::fs::write(path, updated).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
