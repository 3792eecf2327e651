//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Minimum password length accepted at signup.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
            password_min_length: default_password_min(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19_456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}
