//! Server bootstrap: wires storage, repositories and services, then serves.

use std::sync::Arc;

use tracing::{info, warn};

use docman_core::config::AppConfig;
use docman_core::error::AppError;
use docman_database::Repositories;
use docman_storage::{BlobStore, LocalStorageProvider};

use crate::router::build_router;
use crate::state::AppState;

/// Runs the Docman server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Docman server...");

    // ── Step 1: Metadata store ───────────────────────────────────
    info!(provider = %config.database.provider, "Initializing metadata store");
    let repositories = Repositories::connect(&config.database).await?;
    if let Some(pool) = &repositories.pool {
        pool.migrate().await?;
    }

    // ── Step 2: Blob storage ─────────────────────────────────────
    let provider = LocalStorageProvider::new(&config.storage.data_root).await?;
    info!(root = %provider.root().display(), "Blob storage ready");
    let blobs = BlobStore::new(Arc::new(provider));

    // ── Step 3: Services ─────────────────────────────────────────
    let state = AppState::new(config.clone(), repositories.clone(), blobs)?;
    if let Err(e) = state.sessions.purge_expired().await {
        warn!(error = %e, "Failed to purge expired sessions");
    }

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_router(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Docman server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = &repositories.pool {
        pool.close().await;
    }
    info!("Docman server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
