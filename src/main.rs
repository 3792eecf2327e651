//! Docman server: versioned document storage over a REST API.
//!
//! Loads configuration, installs logging and hands over to
//! [`docman_api::run_server`].

use tracing_subscriber::{EnvFilter, fmt};

use docman_core::config::AppConfig;
use docman_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = %config.database.provider,
        visibility = ?config.access.visibility,
        "Configuration loaded"
    );

    if let Err(e) = docman_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `DOCMAN_ENV` overlay and `DOCMAN__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DOCMAN_ENV").unwrap_or_else(|_| "development".to_string());
    let dir = std::env::var("DOCMAN_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
