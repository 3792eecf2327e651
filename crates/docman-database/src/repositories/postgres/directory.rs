//! Directory repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_entity::directory::{CreateDirectory, Directory};

use super::violated_constraint;
use crate::repositories::DirectoryRepository;

/// Postgres-backed [`DirectoryRepository`].
///
/// Sibling uniqueness is enforced by the `directories_parent_name_key`
/// index, so two concurrent creates of the same name resolve in the
/// database rather than in application code.
#[derive(Debug, Clone)]
pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    async fn create(&self, data: CreateDirectory) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "INSERT INTO directories (id, name, parent_id, owner_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, parent_id, owner_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("directories_parent_name_key") => AppError::conflict(format!(
                "Directory '{}' already exists in this location",
                data.name
            )),
            Some("directories_parent_id_fkey") => AppError::not_found(format!(
                "Parent directory {} not found",
                data.parent_id.map(|p| p.to_string()).unwrap_or_default()
            )),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create directory", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT id, name, parent_id, owner_id, created_at FROM directories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find directory", e))
    }

    async fn list_children(&self, parent_id: Option<Uuid>) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT id, name, parent_id, owner_id, created_at FROM directories \
             WHERE parent_id IS NOT DISTINCT FROM $1 ORDER BY name COLLATE \"C\" ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list directories", e))
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "WITH RECURSIVE chain AS ( \
                 SELECT d.id, d.name, d.parent_id, d.owner_id, d.created_at, 0 AS depth \
                 FROM directories d WHERE d.id = $1 \
                 UNION ALL \
                 SELECT p.id, p.name, p.parent_id, p.owner_id, p.created_at, c.depth + 1 \
                 FROM directories p JOIN chain c ON p.id = c.parent_id \
             ) \
             SELECT id, name, parent_id, owner_id, created_at FROM chain ORDER BY depth DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve directory path", e)
        })
    }
}
