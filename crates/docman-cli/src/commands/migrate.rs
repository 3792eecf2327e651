//! Database migration command.

use anyhow::{Context, Result};

use docman_core::config::{AppConfig, DatabaseProvider};
use docman_database::DatabasePool;

use crate::output;

/// Apply pending migrations to the configured Postgres database.
pub async fn execute(config: AppConfig) -> Result<()> {
    if config.database.provider == DatabaseProvider::Memory {
        output::print_success("In-memory metadata store configured; nothing to migrate.");
        return Ok(());
    }

    println!("Running database migrations...");
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let result = pool.migrate().await;
    pool.close().await;
    result.context("Migration failed")?;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
