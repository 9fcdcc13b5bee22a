use std::sync::Arc;

use codearch_core::registry::JobRegistry;
use codearch_core::workspace::Workspace;

use crate::config::ServerConfig;
use crate::engine::JobRunner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Every job accepted since startup.
    pub registry: Arc<JobRegistry>,
    /// On-disk layout for uploads and results.
    pub workspace: Arc<Workspace>,
    /// Background analysis scheduler.
    pub runner: JobRunner,
}

impl AppState {
    /// Wire up the registry, workspace and runner from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let workspace = Arc::new(Workspace::new(
            config.uploads_dir.clone(),
            config.results_dir.clone(),
        ));
        let runner = JobRunner::new(
            Arc::clone(&registry),
            Arc::clone(&workspace),
            Arc::new(config.analyzer.command()),
        );

        Self {
            config: Arc::new(config),
            registry,
            workspace,
            runner,
        }
    }
}
