//! Analyzer command line and its outcome types.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use super::subprocess;

/// How the external analyzer is launched.
///
/// The final command line is `program args... <source_dir> <output_path>`.
#[derive(Debug, Clone)]
pub struct AnalyzerCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Wall-clock limit before the process is killed.
    pub timeout: Duration,
}

/// Captured output from a finished analyzer run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl ToolOutput {
    /// stdout followed by stderr, trimmed. Used in failure messages.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (false, true) => stdout.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Errors that can occur while running the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("analyzer not found: {0}")]
    NotFound(String),

    #[error("analyzer timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("analyzer exited with code {exit_code}: {output}")]
    ExecutionFailed { exit_code: i32, output: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Run the analyzer over `source_dir`, asking it to write to `output_path`.
    ///
    /// A non-zero exit becomes [`ToolError::ExecutionFailed`] carrying the
    /// captured output.
    pub async fn run(&self, source_dir: &Path, output_path: &Path) -> Result<ToolOutput, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(source_dir).arg(output_path);

        let output = subprocess::run_command(&mut cmd, self.timeout).await?;
        if output.exit_code != 0 {
            return Err(ToolError::ExecutionFailed {
                exit_code: output.exit_code,
                output: output.combined(),
            });
        }
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
