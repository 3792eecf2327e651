//! Session lifecycle manager: signup, login, token authentication, logout.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use docman_core::config::AuthConfig;
use docman_core::error::AppError;
use docman_database::repositories::{SessionRepository, UserRepository};
use docman_entity::session::{CreateSession, Session};
use docman_entity::user::{CreateUser, User};

use crate::context::RequestContext;
use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::{PasswordHasher, PasswordPolicy};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Signup input.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// New password.
    pub password: String,
    /// Must equal `password`.
    pub password_confirm: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Bearer token for `Authorization: Token <token>`.
    pub token: String,
    /// The opened session.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// Manages accounts and the session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("policy", &self.policy)
            .field("encoder", &self.encoder)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager from repositories and auth configuration.
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        config: &AuthConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            users,
            sessions,
            hasher: PasswordHasher::new(config)?,
            policy: PasswordPolicy::new(config),
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        })
    }

    /// Register an account. The first account becomes an admin.
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AppError> {
        let email = normalize_email(&request.email)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        self.policy
            .validate(&request.password, &request.password_confirm)?;

        let password_hash = self.hasher.hash_password(&request.password)?;
        let user = self
            .users
            .create(CreateUser {
                email,
                name: name.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password fail with the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AppError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown account");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let now = Utc::now();
        let session = self
            .sessions
            .create(CreateSession {
                id: Uuid::new_v4(),
                user_id: user.id,
                expires_at: self.encoder.expiry_from(now),
            })
            .await?;
        let token = self.encoder.issue(&user, &session)?;
        self.users.record_login(user.id, now).await?;

        info!(user_id = %user.id, session_id = %session.id, "Session opened");
        Ok(LoginResult {
            token,
            session,
            user,
        })
    }

    /// Resolve a bearer token into a request context.
    ///
    /// The token must be validly signed and unexpired, and its session must
    /// still be open.
    pub async fn authenticate(&self, token: &str) -> Result<RequestContext, AppError> {
        let claims = self.decoder.decode(token)?;

        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::authentication("Session not found"))?;
        if session.user_id != claims.user_id() {
            return Err(AppError::authentication("Invalid token"));
        }
        if !session.is_active_at(Utc::now()) {
            return Err(AppError::authentication("Session has ended"));
        }

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        Ok(RequestContext::new(user.id, session.id, user.role, user.email))
    }

    /// Close the caller's session. Its token stops authenticating.
    pub async fn logout(&self, ctx: &RequestContext) -> Result<(), AppError> {
        self.sessions.revoke(ctx.session_id, Utc::now()).await?;
        info!(user_id = %ctx.user_id, session_id = %ctx.session_id, "Session closed");
        Ok(())
    }

    /// Look up the caller's account.
    pub async fn current_user(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", ctx.user_id)))
    }

    /// Drop sessions whose expiry has passed. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let removed = self.sessions.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!(
            "Enter a valid email address: '{}'",
            raw.trim()
        )));
    }
    Ok(email)
}
