//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! No external services are needed: the SQL backends run on an in-process
//! `sqlite::memory:` database or on a file in a temporary directory, and
//! HTTP tests bind the router to an ephemeral localhost port.
//!
//! # Test Categories
//!
//! - `backend_equivalence` - One scenario suite run against every backend
//! - `http_api` - End-to-end requests against a served router

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

pub mod scenarios;

use std::ops::Deref;

use bazaar_storefront::db;
use bazaar_storefront::routes;
use bazaar_storefront::state::{AppState, Repositories};
use secrecy::SecretString;
use tempfile::TempDir;

/// Storage backends under test.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Memory,
    /// Single-connection `sqlite::memory:` pool.
    Sqlite,
    /// Multi-connection pool on a database file, so writers really contend.
    SqliteFile,
}

impl Backend {
    /// Every backend, for tests that must hold on all of them.
    pub const ALL: [Self; 3] = [Self::Memory, Self::Sqlite, Self::SqliteFile];

    /// Fresh, empty storage on this backend.
    pub async fn storage(self) -> TestStorage {
        match self {
            Self::Memory => TestStorage {
                repos: Repositories::in_memory(),
                _dir: None,
            },
            Self::Sqlite => TestStorage {
                repos: sql_repositories("sqlite::memory:").await,
                _dir: None,
            },
            Self::SqliteFile => {
                let dir = tempfile::tempdir().unwrap();
                let url = format!("sqlite://{}?mode=rwc", dir.path().join("bazaar.db").display());
                TestStorage {
                    repos: sql_repositories(&url).await,
                    _dir: Some(dir),
                }
            }
        }
    }
}

async fn sql_repositories(url: &str) -> Repositories {
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    Repositories::sql(pool, db::DEFAULT_OPERATION_TIMEOUT)
}

/// Repositories plus whatever must outlive them, such as a database file.
pub struct TestStorage {
    repos: Repositories,
    _dir: Option<TempDir>,
}

impl Deref for TestStorage {
    type Target = Repositories;

    fn deref(&self) -> &Repositories {
        &self.repos
    }
}

/// A storefront served on an ephemeral localhost port.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    _storage: TestStorage,
}

impl TestServer {
    /// Serve the full router on `backend` in a background task.
    pub async fn start(backend: Backend) -> Self {
        let storage = backend.storage().await;
        let app = routes::app(AppState::new(storage.repos.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _storage: storage,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
