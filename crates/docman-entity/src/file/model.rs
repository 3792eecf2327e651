//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A logical document. Its `id` is stable across every version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier, assigned at first upload.
    pub id: Uuid,
    /// Display name, unique within `directory_id`.
    pub name: String,
    /// Owning directory (None = root).
    pub directory_id: Option<Uuid>,
    /// The user whose upload created the file.
    pub owner_id: Uuid,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a file together with its first version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Pre-generated file id; the first version row references it.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Owning directory.
    pub directory_id: Option<Uuid>,
    /// The uploader.
    pub owner_id: Uuid,
}
