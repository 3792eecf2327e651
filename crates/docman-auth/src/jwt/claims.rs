//! JWT claims carried by session tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docman_entity::user::UserRole;

/// Claims payload embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Session ID this token belongs to.
    pub sid: Uuid,
    /// User role at the time of issuance.
    pub role: UserRole,
    /// User email at the time of issuance.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> Uuid {
        self.sid
    }
}
