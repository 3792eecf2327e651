//! Version handlers: version rows, download by id, upload.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use tracing::debug;

use docman_core::error::AppError;
use docman_core::traits::storage::ByteStream;
use docman_entity::file::FileVersion;

use super::download_response;
use crate::dto::response::UploadResponse;
use crate::error::ApiError;
use crate::extractors::path::parse_optional_uuid;
use crate::extractors::{AuthUser, parse_uuid};
use crate::state::AppState;

/// GET /api/file_versions/
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FileVersion>>, ApiError> {
    Ok(Json(state.registry.list_all_versions(&auth).await?))
}

/// GET /api/file_versions/{id}/
pub async fn get_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FileVersion>, ApiError> {
    let id = parse_uuid(&id)?;
    Ok(Json(state.registry.get_version(&auth, id).await?))
}

/// GET /api/file_versions/{id}/download/
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&id)?;
    let download = state.registry.download_version_by_id(&auth, id).await?;
    Ok(download_response(download)?)
}

/// POST /api/file_versions/upload/ (also /api/file-uploads/)
///
/// Multipart fields: `file` (required), `directory` (optional id, empty
/// means root), `name` (optional, defaults to the part's filename).
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut directory: Option<String> = None;
    let mut name: Option<String> = None;
    let mut part_name: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                part_name = field.file_name().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "directory" | "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                if field_name == "directory" {
                    directory = Some(text);
                } else {
                    name = Some(text);
                }
            }
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .or(part_name)
        .ok_or_else(|| AppError::validation("Missing file name"))?;
    let directory_id = parse_optional_uuid(directory.as_deref())?;

    let chunk: Result<Bytes, std::io::Error> = Ok(data);
    let content: ByteStream = Box::pin(futures::stream::iter([chunk]));

    let outcome = state
        .registry
        .upload_file(&auth, directory_id, &name, content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file: outcome.file,
            version: outcome.version,
        }),
    ))
}
