//! File visibility configuration.

use serde::{Deserialize, Serialize};

/// Who may see files uploaded by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Every authenticated user can read and append to every file.
    Shared,
    /// Members only see their own files; admins see everything.
    Private,
}

/// Access policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Visibility rule applied to reads, appends and "all" listings.
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            visibility: default_visibility(),
        }
    }
}

fn default_visibility() -> Visibility {
    Visibility::Shared
}
