//! CLI subcommands.

pub mod migrate;
pub mod seed;

use bazaar_core::RepositoryError;
use bazaar_storefront::config::{ConfigError, StorageConfig, StorefrontConfig};
use bazaar_storefront::db;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("BAZAAR_STORAGE=memory has no database to operate on")]
    MemoryStorage,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog file: {0}")]
    Catalog(#[from] serde_yaml::Error),

    #[error("Invalid catalog entry '{0}': {1}")]
    InvalidProduct(String, &'static str),
}

/// Connect to the configured `SQLite` database and apply migrations.
///
/// Returns the pool and the per-call repository timeout.
pub async fn connect() -> Result<(SqlitePool, std::time::Duration), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let StorageConfig::Sqlite {
        database_url,
        operation_timeout,
    } = config.storage
    else {
        return Err(CommandError::MemoryStorage);
    };

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    Ok((pool, operation_timeout))
}
