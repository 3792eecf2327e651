//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use docman_auth::{SessionManager, VisibilityPolicy};
use docman_core::config::AppConfig;
use docman_core::result::AppResult;
use docman_database::Repositories;
use docman_service::{DiffEngine, DirectoryTree, FileRegistry, VersionStore};
use docman_storage::BlobStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Metadata repositories
    pub repositories: Repositories,
    /// Content-addressed payload store
    pub blobs: BlobStore,
    /// Accounts and sessions
    pub sessions: Arc<SessionManager>,
    /// Directory hierarchy
    pub directories: Arc<DirectoryTree>,
    /// Files and their versions
    pub registry: Arc<FileRegistry>,
    /// Version diffs
    pub diff: Arc<DiffEngine>,
    /// When the process started serving
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services from configuration, repositories and blob storage.
    pub fn new(config: AppConfig, repositories: Repositories, blobs: BlobStore) -> AppResult<Self> {
        let sessions = SessionManager::new(
            repositories.users.clone(),
            repositories.sessions.clone(),
            &config.auth,
        )?;

        let directories = DirectoryTree::new(repositories.directories.clone());
        let versions = VersionStore::new(repositories.files.clone(), blobs.clone());
        let registry = FileRegistry::new(
            repositories.files.clone(),
            versions,
            directories.clone(),
            Arc::new(VisibilityPolicy::new(config.access.visibility)),
            config.storage.version_retry_attempts,
        );
        let diff = DiffEngine::new(registry.clone(), config.diff.clone());

        Ok(Self {
            config: Arc::new(config),
            repositories,
            blobs,
            sessions: Arc::new(sessions),
            directories: Arc::new(directories),
            registry: Arc::new(registry),
            diff: Arc::new(diff),
            started_at: Instant::now(),
        })
    }
}
