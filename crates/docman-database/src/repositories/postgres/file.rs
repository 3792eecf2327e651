//! File and version repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_entity::file::{CreateFile, File, FileSummary, FileVersion, NewFileVersion};

use super::violated_constraint;
use crate::repositories::FileRepository;

const SUMMARY_QUERY: &str = "\
    SELECT v.id, f.id AS file_id, f.name AS file_name, f.directory_id, f.owner_id, \
           v.version_number, v.digest_hex, v.size_bytes, v.created_at AS updated_at \
    FROM files f \
    JOIN LATERAL ( \
        SELECT fv.id, fv.version_number, fv.digest_hex, fv.size_bytes, fv.created_at \
        FROM file_versions fv WHERE fv.file_id = f.id \
        ORDER BY fv.version_number DESC LIMIT 1 \
    ) v ON TRUE \
    WHERE ($1::uuid IS NULL OR f.owner_id = $1) \
    ORDER BY f.name COLLATE \"C\" ASC, f.id ASC";

/// Postgres-backed [`FileRepository`].
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_version_insert_error(e: sqlx::Error, version: &NewFileVersion) -> AppError {
    match violated_constraint(&e) {
        Some("file_versions_file_id_version_number_key") => AppError::conflict(format!(
            "Version {} of file {} was claimed by a concurrent upload",
            version.version_number, version.file_id
        )),
        Some("file_versions_file_id_fkey") => {
            AppError::not_found(format!("File {} not found", version.file_id))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to insert file version", e),
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_location(
        &self,
        directory_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE directory_id IS NOT DISTINCT FROM $1 AND name = $2",
        )
        .bind(directory_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by name", e))
    }

    async fn create_with_first_version(
        &self,
        file: CreateFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        if version.file_id != file.id {
            return Err(AppError::internal(
                "First version must reference the file being created",
            ));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let created = sqlx::query_as::<_, File>(
            "INSERT INTO files (id, name, directory_id, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(file.id)
        .bind(&file.name)
        .bind(file.directory_id)
        .bind(file.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some("files_directory_name_key") => AppError::conflict(format!(
                "File '{}' already exists in this directory",
                file.name
            )),
            Some("files_directory_id_fkey") => AppError::not_found(format!(
                "Directory {} not found",
                file.directory_id.map(|d| d.to_string()).unwrap_or_default()
            )),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })?;

        let first = sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions \
             (id, file_id, version_number, file_name, digest_hex, size_bytes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(version.file_id)
        .bind(version.version_number)
        .bind(&version.file_name)
        .bind(&version.digest_hex)
        .bind(version.size_bytes)
        .bind(version.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_version_insert_error(e, &version))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit file creation", e)
        })?;

        Ok((created, first))
    }

    async fn insert_version(&self, version: NewFileVersion) -> AppResult<FileVersion> {
        sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions \
             (id, file_id, version_number, file_name, digest_hex, size_bytes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(version.file_id)
        .bind(version.version_number)
        .bind(&version.file_name)
        .bind(&version.digest_hex)
        .bind(version.size_bytes)
        .bind(version.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_version_insert_error(e, &version))
    }

    async fn max_version_number(&self, file_id: Uuid) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version_number) FROM file_versions WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read latest version number", e)
        })
    }

    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn find_version(&self, file_id: Uuid, number: i32) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn find_version_by_id(&self, id: Uuid) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>("SELECT * FROM file_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn list_summaries(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileSummary>> {
        sqlx::query_as::<_, FileSummary>(SUMMARY_QUERY)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn list_all_versions(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT fv.* FROM file_versions fv JOIN files f ON f.id = fv.file_id \
             WHERE ($1::uuid IS NULL OR f.owner_id = $1) \
             ORDER BY fv.created_at DESC, fv.version_number DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }
}
