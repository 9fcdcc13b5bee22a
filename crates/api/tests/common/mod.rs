#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;

use codearch_api::config::{AnalyzerConfig, RetentionConfig, ServerConfig};
use codearch_api::router::build_app_router;
use codearch_api::state::AppState;

/// Stub analyzer: writes a result document, reporting a hardcoded-secret
/// finding when any extracted file mentions `secret`.
pub const FINDING_ANALYZER: &str = r#"src="$1"
out="$2"
issues='[]'
if grep -rqi 'secret' "$src"; then
  issues='[{"type": "Hardcoded Secret", "severity": "Medium", "file": "app.py", "line": 1, "description": "Potential hardcoded secret found"}]'
fi
cat > "$out" <<EOF
{"job_id": "", "project_name": "$(basename "$src")", "total_files": 1, "total_lines": 1,
 "languages": {"Python": 1}, "complexity_score": 1.0, "security_issues": $issues,
 "code_smells": [], "business_logic": [], "recommendations": [], "generated_at": "2026-01-01T00:00:00"}
EOF
"#;

/// Test environment owning its scratch directory.
pub struct TestApp {
    pub root: tempfile::TempDir,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    /// Clone of the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` rooted in `root`, running `script` via `sh`.
pub fn test_config(root: &Path, script: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        uploads_dir: root.join("uploads"),
        results_dir: root.join("results"),
        static_dir: root.join("static"),
        max_upload_bytes: 10 * 1024 * 1024,
        analyzer: AnalyzerConfig {
            program: "sh".to_string(),
            args: vec![script.to_string_lossy().into_owned()],
            timeout_secs: 30,
        },
        retention: RetentionConfig {
            max_age_hours: None,
            interval_secs: 3600,
        },
    }
}

/// Build the full application with all middleware layers and an analyzer
/// stub whose shell body is `analyzer_body`.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub async fn build_test_app(analyzer_body: &str) -> TestApp {
    let root = tempfile::tempdir().expect("create temp dir");
    let script = write_analyzer(root.path(), analyzer_body);
    let config = test_config(root.path(), &script);

    let state = AppState::new(config.clone());
    state
        .workspace
        .ensure_dirs()
        .await
        .expect("create workspace dirs");
    let router = build_app_router(state.clone(), &config);

    TestApp {
        root,
        state,
        router,
    }
}

pub fn write_analyzer(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("analyzer.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write analyzer script");
    path
}

/// Build an in-memory ZIP archive from `(name, contents)` pairs.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(body.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

const BOUNDARY: &str = "codearch-test-boundary";

/// Encode a single multipart file field.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a multipart upload with one field.
pub async fn upload(app: Router, field: &str, data: &[u8]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, "codebase.zip", data)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Upload `data` as the `codebase` field and return the new job id.
pub async fn submit(app: Router, data: &[u8]) -> String {
    let response = upload(app, "codebase", data).await;
    assert_eq!(response.status(), 200, "upload should be accepted");
    let json = body_json(response).await;
    json["job_id"].as_str().expect("job_id string").to_string()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `/api/job/{id}` until the job is terminal, recording every status seen.
pub async fn wait_for_terminal(app: &Router, job_id: &str) -> (serde_json::Value, Vec<String>) {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);

    loop {
        let json = body_json(get(app.clone(), &format!("/api/job/{job_id}")).await).await;
        let status = json["status"].as_str().expect("status string").to_string();
        if seen.last() != Some(&status) {
            seen.push(status.clone());
        }
        if status == "completed" || status == "failed" {
            return (json, seen);
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} did not finish; statuses seen: {seen:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
