//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docman_entity::file::{File, FileVersion};
use docman_entity::user::{User, UserRole};
use docman_service::{Delta, DiffStats};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Metadata backend name.
    pub database: String,
    /// Whether the metadata backend answered.
    pub database_ok: bool,
    /// Whether blob storage is reachable.
    pub storage_ok: bool,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Session token for `Authorization: Token <token>`.
    pub token: String,
}

/// Signup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// New user id.
    pub id: Uuid,
    /// Normalized email.
    pub email: String,
}

/// Current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Upload result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// The file the version belongs to.
    pub file: File,
    /// The new version.
    pub version: FileVersion,
}

/// Breadcrumb of a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryPathResponse {
    /// The directory resolved.
    pub directory_id: Uuid,
    /// Names from the top-level ancestor down to the directory.
    pub names: Vec<String>,
}

/// Diff between two versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResponse {
    /// File diffed.
    pub file_id: Uuid,
    /// The delta.
    #[serde(flatten)]
    pub delta: Delta,
    /// Line counts.
    pub stats: DiffStats,
}
