//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email, stored lower-cased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2 password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
///
/// The role is not part of the request: the repository assigns it when
/// the row is inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Normalized email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Pre-hashed password.
    pub password_hash: String,
}
