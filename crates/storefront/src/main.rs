//! Bazaar Storefront - JSON API for users, catalog, and carts.
//!
//! This binary serves the storefront API on port 8080 by default.
//!
//! # Architecture
//!
//! - Axum web framework with JSON request/response bodies
//! - Repository traits from `bazaar-core`, backed by `SQLite` (sqlx) or by
//!   in-memory maps, selected with `BAZAAR_STORAGE`
//! - Schema migrations applied on startup when `SQLite`-backed

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;

use bazaar_storefront::config::{StorageConfig, StorefrontConfig};
use bazaar_storefront::db;
use bazaar_storefront::routes;
use bazaar_storefront::state::{AppState, Repositories};
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reasons the server fails to start or stops abnormally.
#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to create database pool: {0}")]
    Pool(#[source] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to bind to {0}: {1}")]
    Bind(SocketAddr, #[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Connect the configured storage backend.
///
/// For `SQLite`, pending migrations are applied before any request is served.
async fn connect_storage(storage: &StorageConfig) -> Result<Repositories, StartupError> {
    match storage {
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories::in_memory())
        }
        StorageConfig::Sqlite {
            database_url,
            operation_timeout,
        } => {
            let pool = db::create_pool(database_url)
                .await
                .map_err(StartupError::Pool)?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Migrations applied");

            Ok(Repositories::sql(pool, *operation_timeout))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)] // Tracing is not initialized yet
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_core=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<(), StartupError> {
    let repositories = connect_storage(&config.storage).await?;
    let addr = config.socket_addr();
    let app = routes::app(AppState::new(repositories));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Bind(addr, e))?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_startup_error_keeps_source() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let err = StartupError::Bind(
            addr,
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        );
        assert_eq!(err.to_string(), "failed to bind to 127.0.0.1:8080: in use");
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_connect_storage_reports_bad_database_url() {
        let storage = StorageConfig::Sqlite {
            database_url: secrecy::SecretString::from("sqlite://bazaar.db?mode=bogus"),
            operation_timeout: db::DEFAULT_OPERATION_TIMEOUT,
        };
        let err = connect_storage(&storage).await.err().unwrap();
        assert!(matches!(err, StartupError::Pool(_)));
    }
}
