//! Session token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use docman_core::config::AuthConfig;
use docman_core::error::AppError;
use docman_entity::session::Session;
use docman_entity::user::User;

use super::claims::Claims;

/// Creates signed HS256 session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").field("ttl", &self.ttl).finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours as i64),
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Expiry for a session opened at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }

    /// Issue the token for a freshly opened session.
    pub fn issue(&self, user: &User, session: &Session) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.id,
            sid: session.id,
            role: user.role,
            email: user.email.clone(),
            iat: session.created_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }
}
