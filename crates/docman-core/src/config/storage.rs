//! Blob storage and upload configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for version payloads.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Maximum upload size in bytes (default 512 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// How many times an upload re-reads the latest version number after
    /// losing a race before giving up with a conflict.
    #[serde(default = "default_retry_attempts")]
    pub version_retry_attempts: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            max_upload_size_bytes: default_max_upload(),
            version_retry_attempts: default_retry_attempts(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_max_upload() -> u64 {
    512 * 1024 * 1024
}

fn default_retry_attempts() -> u32 {
    5
}
