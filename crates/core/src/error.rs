//! Repository error type shared by all storage backends.

use std::time::Duration;

use thiserror::Error;

/// Boxed error from a concrete storage engine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by repositories and by the cart domain logic.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Checkout attempted on a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Email unknown or password mismatch. The two cases are not distinguished.
    #[error("invalid email or password")]
    InvalidLogin,

    /// Adding to a cart line would overflow its quantity. Nothing was changed.
    #[error("cart quantity too large")]
    QuantityOverflow,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The operation exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure of the storage engine.
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

impl RepositoryError {
    /// Wrap a storage engine error.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
