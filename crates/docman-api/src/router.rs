//! Route definitions for the Docman HTTP API.
//!
//! Paths keep the trailing slash the web client sends.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Requests still running after `timeout` are answered with 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(account_routes())
        .merge(file_routes())
        .merge(version_routes())
        .merge(directory_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(timeout_layer(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health/", get(handlers::health::health))
}

/// Signup, login, logout, me
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/signup/", post(handlers::accounts::signup))
        .route("/accounts/login/", post(handlers::accounts::login))
        .route("/accounts/logout/", post(handlers::accounts::logout))
        .route("/accounts/me/", get(handlers::accounts::me))
}

/// File listings, history, downloads by number, diffs
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/", get(handlers::files::list_all_files))
        .route("/files/user/", get(handlers::files::list_my_files))
        .route("/files/{file_id}/", get(handlers::files::get_file))
        .route("/files/{file_id}/versions/", get(handlers::files::list_versions))
        .route(
            "/files/{file_id}/versions/{selector}/download/",
            get(handlers::files::download_version),
        )
        .route("/files/{file_id}/diff/", get(handlers::files::diff))
}

/// Version rows, downloads by id, uploads
fn version_routes() -> Router<AppState> {
    Router::new()
        .route("/file_versions/", get(handlers::file_versions::list_versions))
        .route("/file_versions/upload/", post(handlers::file_versions::upload))
        .route("/file-uploads/", post(handlers::file_versions::upload))
        .route("/file_versions/{id}/", get(handlers::file_versions::get_version))
        .route(
            "/file_versions/{id}/download/",
            get(handlers::file_versions::download),
        )
}

/// Directory tree
fn directory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/file_versions/directories/",
            get(handlers::directories::list_directories)
                .post(handlers::directories::create_directory),
        )
        .route(
            "/file_versions/directories/{id}/",
            get(handlers::directories::get_directory),
        )
        .route(
            "/file_versions/directories/{id}/path/",
            get(handlers::directories::directory_path),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_requests_time_out_with_408() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(20)));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
