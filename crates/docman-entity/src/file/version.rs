//! File version entity and version selectors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use docman_core::AppError;

/// One immutable snapshot of a file. Rows are only ever inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// 1-based, gap-free, strictly increasing per file.
    pub version_number: i32,
    /// File name at the time of upload.
    pub file_name: String,
    /// SHA-256 of the payload, lowercase hex.
    pub digest_hex: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// The uploader.
    pub created_by: Uuid,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a version row.
#[derive(Debug, Clone)]
pub struct NewFileVersion {
    /// Owning file.
    pub file_id: Uuid,
    /// Number claimed by this insert.
    pub version_number: i32,
    /// File name at the time of upload.
    pub file_name: String,
    /// Payload digest.
    pub digest_hex: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// The uploader.
    pub created_by: Uuid,
}

/// Picks one version of a file: an explicit number or the newest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionSelector {
    /// The highest version number.
    Latest,
    /// An explicit version number.
    Number(i32),
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        match s.parse::<i32>() {
            Ok(n) if n >= 1 => Ok(Self::Number(n)),
            _ => Err(AppError::validation(format!(
                "Invalid version '{s}': expected a positive integer or 'latest'"
            ))),
        }
    }
}

impl TryFrom<String> for VersionSelector {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionSelector> for String {
    fn from(value: VersionSelector) -> Self {
        value.to_string()
    }
}
