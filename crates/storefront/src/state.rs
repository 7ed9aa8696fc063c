//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{
    CartRepository, InMemoryCartRepository, InMemoryProductRepository, InMemoryUserRepository,
    ProductRepository, UserRepository,
};
use sqlx::SqlitePool;

use crate::db::{SqlCartRepository, SqlProductRepository, SqlUserRepository};

/// The three repositories, all on the same backend.
#[derive(Clone)]
pub struct Repositories {
    /// User storage
    pub users: Arc<dyn UserRepository>,
    /// Product catalog storage
    pub products: Arc<dyn ProductRepository>,
    /// Cart storage
    pub carts: Arc<dyn CartRepository>,
    /// Pool behind the SQL repositories, `None` for in-memory storage
    pub pool: Option<SqlitePool>,
}

impl Repositories {
    /// Fresh, empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            carts: Arc::new(InMemoryCartRepository::new()),
            pool: None,
        }
    }

    /// SQL repositories sharing one pool, each call bounded by `timeout`.
    #[must_use]
    pub fn sql(pool: SqlitePool, timeout: Duration) -> Self {
        Self {
            users: Arc::new(SqlUserRepository::with_timeout(pool.clone(), timeout)),
            products: Arc::new(SqlProductRepository::with_timeout(pool.clone(), timeout)),
            carts: Arc::new(SqlCartRepository::with_timeout(pool.clone(), timeout)),
            pool: Some(pool),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repositories: Repositories,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `repositories` - Storage backend, already connected and migrated
    #[must_use]
    pub fn new(repositories: Repositories) -> Self {
        Self {
            inner: Arc::new(AppStateInner { repositories }),
        }
    }

    /// User repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.repositories.users.as_ref()
    }

    /// Product repository.
    #[must_use]
    pub fn products(&self) -> &dyn ProductRepository {
        self.inner.repositories.products.as_ref()
    }

    /// Cart repository.
    #[must_use]
    pub fn carts(&self) -> &dyn CartRepository {
        self.inner.repositories.carts.as_ref()
    }

    /// Get a reference to the database connection pool, if SQL-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&SqlitePool> {
        self.inner.repositories.pool.as_ref()
    }
}
