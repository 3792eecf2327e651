//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use docman_auth::SignupRequest;
use docman_core::error::AppError;
use docman_entity::file::VersionSelector;

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupBody {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Password confirmation.
    #[serde(default)]
    pub password_confirm: String,
}

impl From<SignupBody> for SignupRequest {
    fn from(body: SignupBody) -> Self {
        Self {
            email: body.email,
            name: body.name,
            password: body.password,
            password_confirm: body.password_confirm,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Directory creation form (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectoryForm {
    /// Parent directory id; empty or absent means root.
    #[serde(default)]
    pub parent: Option<String>,
    /// New directory name.
    pub name: String,
}

/// `?parent=` filter for directory listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryQuery {
    /// Parent directory id; empty or absent means root.
    #[serde(default)]
    pub parent: Option<String>,
}

/// `?from=&to=` for diffs. Each side is a version number or `latest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffQuery {
    /// Base version.
    #[serde(default)]
    pub from: Option<String>,
    /// Target version.
    #[serde(default)]
    pub to: Option<String>,
}

impl DiffQuery {
    /// Parse both selectors. A missing side is a validation error.
    pub fn selectors(&self) -> Result<(VersionSelector, VersionSelector), AppError> {
        let parse = |name: &str, value: &Option<String>| -> Result<VersionSelector, AppError> {
            value
                .as_deref()
                .ok_or_else(|| AppError::validation(format!("Query parameter '{name}' is required")))?
                .parse::<VersionSelector>()
        };
        Ok((parse("from", &self.from)?, parse("to", &self.to)?))
    }
}

/// Run `validator` rules and convert failures into a validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
