//! Listing rows: a file joined with its latest version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::model::File;
use super::version::FileVersion;

/// Which files a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListScope {
    /// Files owned by the caller.
    Mine,
    /// Every file the caller may see.
    All,
}

/// A file with enough of its latest version for list display.
///
/// `id` is the latest version's id, so a listing row can be handed straight
/// to the version download endpoint; `file_id` is the stable file identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileSummary {
    /// Latest version id.
    pub id: Uuid,
    /// File id.
    pub file_id: Uuid,
    /// Current file name.
    pub file_name: String,
    /// Owning directory.
    pub directory_id: Option<Uuid>,
    /// File owner.
    pub owner_id: Uuid,
    /// Latest version number.
    pub version_number: i32,
    /// Digest of the latest version.
    pub digest_hex: String,
    /// Size of the latest version.
    pub size_bytes: i64,
    /// When the latest version was created.
    pub updated_at: DateTime<Utc>,
}

impl FileSummary {
    /// Build a summary from a file and its latest version.
    pub fn from_parts(file: &File, latest: &FileVersion) -> Self {
        Self {
            id: latest.id,
            file_id: file.id,
            file_name: file.name.clone(),
            directory_id: file.directory_id,
            owner_id: file.owner_id,
            version_number: latest.version_number,
            digest_hex: latest.digest_hex.clone(),
            size_bytes: latest.size_bytes,
            updated_at: latest.created_at,
        }
    }
}
