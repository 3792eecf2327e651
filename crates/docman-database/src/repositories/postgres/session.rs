//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_entity::session::{CreateSession, Session};

use crate::repositories::SessionRepository;

/// Postgres-backed [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, data: CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET revoked_at = COALESCE(revoked_at, $2) WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke session", e))?;
        Ok(())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
