//! File handlers: listings, file detail, version history, downloads, diffs.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;

use docman_entity::file::{FileSummary, FileVersion, ListScope, VersionSelector};

use super::download_response;
use crate::dto::request::DiffQuery;
use crate::dto::response::DiffResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_uuid};
use crate::state::AppState;

/// GET /api/files/user/
pub async fn list_my_files(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FileSummary>>, ApiError> {
    Ok(Json(state.registry.list_files(&auth, ListScope::Mine).await?))
}

/// GET /api/files/
pub async fn list_all_files(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FileSummary>>, ApiError> {
    Ok(Json(state.registry.list_files(&auth, ListScope::All).await?))
}

/// GET /api/files/{file_id}/
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<FileSummary>, ApiError> {
    let file_id = parse_uuid(&file_id)?;
    Ok(Json(state.registry.get_file_summary(&auth, file_id).await?))
}

/// GET /api/files/{file_id}/versions/
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<Vec<FileVersion>>, ApiError> {
    let file_id = parse_uuid(&file_id)?;
    Ok(Json(state.registry.list_versions(&auth, file_id).await?))
}

/// GET /api/files/{file_id}/versions/{selector}/download/
pub async fn download_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((file_id, selector)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let file_id = parse_uuid(&file_id)?;
    let selector: VersionSelector = selector.parse()?;
    let download = state
        .registry
        .download_version(&auth, file_id, selector)
        .await?;
    Ok(download_response(download)?)
}

/// GET /api/files/{file_id}/diff/?from=&to=
pub async fn diff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<String>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<DiffResponse>, ApiError> {
    let file_id = parse_uuid(&file_id)?;
    let (from, to) = query.selectors()?;
    let delta = state.diff.diff(&auth, file_id, from, to).await?;
    Ok(Json(DiffResponse {
        file_id,
        stats: delta.stats(),
        delta,
    }))
}
