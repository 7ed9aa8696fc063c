//! Authentication error types.

use bazaar_core::RepositoryError;
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing from a registration request.
    #[error("email and password required")]
    MissingCredentials,

    /// Repository error, including `InvalidLogin` for failed logins.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
