//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BAZAAR_STORAGE` - Storage backend, `sqlite` or `memory` (default: sqlite)
//! - `BAZAAR_DATABASE_URL` - `SQLite` connection string, falls back to
//!   `DATABASE_URL` (default: `sqlite://bazaar.db?mode=rwc`)
//! - `BAZAAR_DB_TIMEOUT_SECS` - Per-call deadline for SQL repositories (default: 3)
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 8080)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::db::DEFAULT_OPERATION_TIMEOUT;

const DEFAULT_DATABASE_URL: &str = "sqlite://bazaar.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where repositories keep their data.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Process-local maps; data is lost on restart.
    Memory,
    /// `SQLite` database.
    Sqlite {
        /// Connection URL (may contain credentials in other engines, kept secret)
        database_url: SecretString,
        /// Deadline applied to each repository call
        operation_timeout: Duration,
    },
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storage backend selection
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let host = get_or("BAZAAR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_HOST".to_owned(), e.to_string()))?;
        let port = get_or("BAZAAR_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_PORT".to_owned(), e.to_string()))?;

        let storage = match get_or("BAZAAR_STORAGE", "sqlite").to_lowercase().as_str() {
            "memory" => StorageConfig::Memory,
            "sqlite" => {
                let database_url = lookup("BAZAAR_DATABASE_URL")
                    .or_else(|| lookup("DATABASE_URL"))
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
                let operation_timeout = match lookup("BAZAAR_DB_TIMEOUT_SECS") {
                    Some(raw) => parse_timeout(&raw)?,
                    None => DEFAULT_OPERATION_TIMEOUT,
                };
                StorageConfig::Sqlite {
                    database_url: SecretString::from(database_url),
                    operation_timeout,
                }
            }
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "BAZAAR_STORAGE".to_owned(),
                    format!("expected 'sqlite' or 'memory', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            storage,
            host,
            port,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("BAZAAR_DB_TIMEOUT_SECS".to_owned(), reason);

    let secs = raw.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be at least 1 second".to_owned()));
    }
    Ok(Duration::from_secs(secs))
}
