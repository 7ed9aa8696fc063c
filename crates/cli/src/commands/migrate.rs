//! Database migration command.
//!
//! Applies every pending migration from `crates/storefront/migrations/`.
//! Already-applied migrations are skipped, so running it twice is harmless.

use super::{CommandError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let (pool, _) = connect().await?;
    pool.close().await;

    tracing::info!("Migrations complete");
    Ok(())
}
