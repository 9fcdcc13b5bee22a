use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use codearch_core::tool::AnalyzerCommand;

use crate::background::job_retention;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight analysis jobs (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Where uploaded archives and extracted trees live (default: `uploads`).
    pub uploads_dir: PathBuf,
    /// Where result documents are written (default: `results`).
    pub results_dir: PathBuf,
    /// Served under `/static` when the directory exists (default: `static`).
    pub static_dir: PathBuf,
    /// Body limit for the upload endpoint (default: 100 MiB).
    pub max_upload_bytes: usize,
    /// External analyzer invocation.
    pub analyzer: AnalyzerConfig,
    /// Eviction of finished jobs.
    pub retention: RetentionConfig,
}

/// How to launch the external analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

/// Retention policy for finished jobs and their files.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Age after completion at which a job is evicted. `None` disables eviction.
    pub max_age_hours: Option<i64>,
    /// How often the sweeper runs.
    pub interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `8080`                  |
    /// | `CORS_ORIGINS`                | `*`                     |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                    |
    /// | `UPLOADS_DIR`                 | `uploads`               |
    /// | `RESULTS_DIR`                 | `results`               |
    /// | `STATIC_DIR`                  | `static`                |
    /// | `MAX_UPLOAD_BYTES`            | `104857600`             |
    /// | `ANALYZER_PROGRAM`            | `python3`               |
    /// | `ANALYZER_ARGS`               | `analyzer.py`           |
    /// | `ANALYZER_TIMEOUT_SECS`       | `600`                   |
    /// | `JOB_RETENTION_HOURS`         | unset (disabled)        |
    /// | `JOB_RETENTION_INTERVAL_SECS` | `3600`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_parse("PORT", 8080);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = env_parse("SHUTDOWN_TIMEOUT_SECS", 30);

        let uploads_dir = env_path("UPLOADS_DIR", "uploads");
        let results_dir = env_path("RESULTS_DIR", "results");
        let static_dir = env_path("STATIC_DIR", "static");

        let max_upload_bytes: usize = env_parse("MAX_UPLOAD_BYTES", 100 * 1024 * 1024);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            uploads_dir,
            results_dir,
            static_dir,
            max_upload_bytes,
            analyzer: AnalyzerConfig::from_env(),
            retention: RetentionConfig::from_env(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let program = std::env::var("ANALYZER_PROGRAM").unwrap_or_else(|_| "python3".into());
        let args = std::env::var("ANALYZER_ARGS")
            .unwrap_or_else(|_| "analyzer.py".into())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let timeout_secs = env_parse("ANALYZER_TIMEOUT_SECS", 600);

        Self {
            program,
            args,
            timeout_secs,
        }
    }

    /// Build the command the orchestrator runs for each job.
    pub fn command(&self) -> AnalyzerCommand {
        AnalyzerCommand::new(
            self.program.clone(),
            self.args.clone(),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

impl RetentionConfig {
    pub fn from_env() -> Self {
        let max_age_hours =
            parse_retention_hours(std::env::var("JOB_RETENTION_HOURS").ok().as_deref());
        let interval_secs = env_parse("JOB_RETENTION_INTERVAL_SECS", 3600);

        Self {
            max_age_hours,
            interval_secs,
        }
    }
}

/// Interpret `JOB_RETENTION_HOURS`. Unset or non-positive disables retention;
/// a value too large to subtract from the current time panics at startup.
fn parse_retention_hours(raw: Option<&str>) -> Option<i64> {
    let hours: i64 = raw?
        .trim()
        .parse()
        .unwrap_or_else(|e| panic!("JOB_RETENTION_HOURS must be a valid i64: {e}"));
    if hours <= 0 {
        return None;
    }
    if job_retention::cutoff(Utc::now(), hours).is_none() {
        panic!("JOB_RETENTION_HOURS={hours} is out of range");
    }
    Some(hours)
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// Panics on a present but malformed value so misconfiguration fails fast.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(key).unwrap_or_else(|_| default.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_hours_unset_or_non_positive_disables() {
        assert_eq!(parse_retention_hours(None), None);
        assert_eq!(parse_retention_hours(Some("0")), None);
        assert_eq!(parse_retention_hours(Some("-5")), None);
    }

    #[test]
    fn retention_hours_accepts_reasonable_values() {
        assert_eq!(parse_retention_hours(Some(" 24 ")), Some(24));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn retention_hours_too_large_fails_fast() {
        parse_retention_hours(Some("9223372036854775807"));
    }

    #[test]
    #[should_panic(expected = "must be a valid i64")]
    fn retention_hours_malformed_fails_fast() {
        parse_retention_hours(Some("forever"));
    }
}
