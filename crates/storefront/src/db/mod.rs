//! SQL-backed repositories on `SQLite`.
//!
//! # Tables
//!
//! - `users` - Registered users (email unique)
//! - `products` - Catalog
//! - `cart_items` - One row per (user, product), unique on that pair
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded at
//! build time, and applied idempotently on startup or via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```
//!
//! Every repository call runs under its own deadline (see
//! [`DEFAULT_OPERATION_TIMEOUT`]) and is never retried.

mod carts;
mod products;
mod users;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use bazaar_core::RepositoryError;
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use carts::SqlCartRepository;
pub use products::SqlProductRepository;
pub use users::SqlUserRepository;

/// Per-call deadline for SQL repository operations.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Schema migrations from `crates/storefront/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing. In-memory URLs get a single
/// long-lived connection, since every `SQLite` memory connection is its own
/// database.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let pool_options = if is_memory_url(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply all pending migrations. Safe to call repeatedly.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the recorded history does
/// not match the embedded migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Run a repository operation under `limit`.
///
/// The inner future is dropped when the deadline passes, which rolls back any
/// open transaction.
async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_elapsed| RepositoryError::Timeout(limit))?
}

/// Translate a sqlx error into a repository error.
///
/// `conflict` is the message used when a unique constraint is violated.
fn db_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(conflict.to_owned())
        }
        other => RepositoryError::backend(other),
    }
}
