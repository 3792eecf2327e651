//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod access;
pub mod app;
pub mod auth;
pub mod database;
pub mod diff;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::access::{AccessConfig, Visibility};
pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::diff::DiffConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blob storage and upload settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// File visibility policy.
    #[serde(default)]
    pub access: AccessConfig,
    /// Version diff limits.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCMAN__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Same as [`AppConfig::load`] with an explicit configuration directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCMAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.provider = \"postgres\"",
            ));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 16 characters",
            ));
        }
        if self.storage.version_retry_attempts == 0 {
            return Err(AppError::configuration(
                "storage.version_retry_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}
