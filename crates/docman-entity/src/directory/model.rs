//! Directory entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named node in the directory tree.
///
/// The root is implicit: a directory with `parent_id = None` hangs directly
/// below it. `parent_id` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Directory {
    /// Unique directory identifier.
    pub id: Uuid,
    /// Directory name, unique among its siblings.
    pub name: String,
    /// Parent directory (None = child of the root).
    pub parent_id: Option<Uuid>,
    /// The user who created the directory.
    pub owner_id: Uuid,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
}

impl Directory {
    /// Check if this directory sits directly below the root.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectory {
    /// Parent directory (None for root).
    pub parent_id: Option<Uuid>,
    /// Directory name.
    pub name: String,
    /// The creating user.
    pub owner_id: Uuid,
}
