//! Directory handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};

use docman_entity::directory::Directory;

use crate::dto::request::{CreateDirectoryForm, DirectoryQuery};
use crate::dto::response::DirectoryPathResponse;
use crate::error::ApiError;
use crate::extractors::path::parse_optional_uuid;
use crate::extractors::{AuthUser, parse_uuid};
use crate::state::AppState;

/// GET /api/file_versions/directories/?parent=
pub async fn list_directories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<Directory>>, ApiError> {
    let parent = parse_optional_uuid(query.parent.as_deref())?;
    Ok(Json(state.directories.list_children(parent).await?))
}

/// POST /api/file_versions/directories/
pub async fn create_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Form(form): Form<CreateDirectoryForm>,
) -> Result<(StatusCode, Json<Directory>), ApiError> {
    let parent = parse_optional_uuid(form.parent.as_deref())?;
    let directory = state
        .directories
        .create_directory(&auth, parent, &form.name)
        .await?;
    Ok((StatusCode::CREATED, Json(directory)))
}

/// GET /api/file_versions/directories/{id}/
pub async fn get_directory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Directory>, ApiError> {
    let id = parse_uuid(&id)?;
    Ok(Json(state.directories.get_directory(id).await?))
}

/// GET /api/file_versions/directories/{id}/path/
pub async fn directory_path(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DirectoryPathResponse>, ApiError> {
    let id = parse_uuid(&id)?;
    let names = state.directories.resolve_path(id).await?;
    Ok(Json(DirectoryPathResponse {
        directory_id: id,
        names,
    }))
}
