use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codearch_api::background::job_retention;
use codearch_api::config::ServerConfig;
use codearch_api::router::build_app_router;
use codearch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "codearch_api=debug,codearch_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        analyzer = %config.analyzer.program,
        "Loaded server configuration"
    );

    // --- App state ---
    let state = AppState::new(config.clone());

    state
        .workspace
        .ensure_dirs()
        .await
        .expect("Failed to create upload/result directories");
    tracing::info!(
        uploads = %state.workspace.uploads_dir().display(),
        results = %state.workspace.results_dir().display(),
        "Workspace directories ready"
    );

    // --- Job retention ---
    let retention_cancel = CancellationToken::new();
    let retention_handle = config.retention.max_age_hours.map(|max_age_hours| {
        tokio::spawn(job_retention::run(
            Arc::clone(&state.registry),
            Arc::clone(&state.workspace),
            max_age_hours,
            Duration::from_secs(config.retention.interval_secs),
            retention_cancel.clone(),
        ))
    });
    if retention_handle.is_none() {
        tracing::info!("Job retention disabled");
    }

    let runner = state.runner.clone();

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Job retention task stopped");
    }

    let in_flight = runner.in_flight();
    tracing::info!(in_flight, "Waiting for running analysis jobs");
    if runner
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await
    {
        tracing::info!("All analysis jobs finished");
    } else {
        tracing::warn!(
            remaining = runner.in_flight(),
            "Shutdown timeout reached with analysis jobs still running"
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
