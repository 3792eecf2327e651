//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_entity::user::{CreateUser, User};

use super::violated_constraint;
use crate::repositories::UserRepository;

/// Postgres-backed [`UserRepository`].
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let db_err = |e: sqlx::Error| match violated_constraint(&e) {
            Some("users_email_key") => {
                AppError::conflict(format!("An account with email '{}' already exists", data.email))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        };

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        // Serializes account creation so only one insert can see an empty table.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, password_hash, role) \
             SELECT $1, $2, $3, $4, \
                    CASE WHEN EXISTS (SELECT 1 FROM users) \
                         THEN 'member'::user_role ELSE 'admin'::user_role END \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record login", e))?;
        Ok(())
    }
}
