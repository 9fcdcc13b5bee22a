//! External analyzer invocation.
//!
//! The analyzer is an opaque program that receives an extracted source tree
//! and an output path, and writes a result document to that path. This
//! module only knows how to spawn it, bound its runtime, and capture its
//! output for diagnostics.

pub mod command;
pub mod subprocess;

pub use command::{AnalyzerCommand, ToolError, ToolOutput};

/// Shared test helpers for analyzer tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::AnalyzerCommand;

    /// Write `body` as a `sh` script in `dir` and return its path.
    pub fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("analyzer.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
        path
    }

    /// Analyzer that runs `script` through `sh` with a 5-second deadline.
    pub fn sh_analyzer(script: &Path) -> AnalyzerCommand {
        AnalyzerCommand::new(
            "sh",
            vec![script.to_string_lossy().into_owned()],
            Duration::from_secs(5),
        )
    }
}
