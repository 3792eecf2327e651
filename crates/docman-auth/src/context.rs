//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docman_entity::user::UserRole;

/// Identity of the caller, resolved from a session token.
///
/// Services receive it explicitly on every call; nothing reads the current
/// user from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The session the token belongs to.
    pub session_id: Uuid,
    /// The user's role.
    pub role: UserRole,
    /// The user's email.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Build a context for a user and session.
    pub fn new(user_id: Uuid, session_id: Uuid, role: UserRole, email: impl Into<String>) -> Self {
        Self {
            user_id,
            session_id,
            role,
            email: email.into(),
            request_time: Utc::now(),
        }
    }

    /// Whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
