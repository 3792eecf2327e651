//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session. Created at login, revoked at logout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Session identifier (the token's `sid` claim).
    pub id: Uuid,
    /// The session owner.
    pub user_id: Uuid,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
    /// Set when the user logs out.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Check whether the session can still authenticate requests at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Data required to open a session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// Pre-generated session id.
    pub id: Uuid,
    /// The session owner.
    pub user_id: Uuid,
    /// Hard expiry.
    pub expires_at: DateTime<Utc>,
}
