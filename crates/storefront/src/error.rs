//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Every error body is JSON of the form `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_core::RepositoryError;
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// Flatten auth errors so storage failures map the same way everywhere.
    fn repository(&self) -> Option<&RepositoryError> {
        match self {
            Self::Repository(err) | Self::Auth(AuthError::Repository(err)) => Some(err),
            _ => None,
        }
    }

    fn is_server_error(&self) -> bool {
        matches!(
            self.repository(),
            Some(RepositoryError::Backend(_) | RepositoryError::Timeout(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Auth(AuthError::MissingCredentials) => {
                StatusCode::BAD_REQUEST
            }
            Self::Repository(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::QuantityOverflow => StatusCode::BAD_REQUEST,
                RepositoryError::EmptyCart | RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InvalidLogin => StatusCode::UNAUTHORIZED,
                RepositoryError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
                RepositoryError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Auth(err @ AuthError::MissingCredentials) => err.to_string(),
            Self::Repository(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => "not found".to_owned(),
                RepositoryError::EmptyCart => "cart is empty".to_owned(),
                RepositoryError::QuantityOverflow => "quantity too large".to_owned(),
                RepositoryError::InvalidLogin => "invalid credentials".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Timeout(_) => "storage unavailable".to_owned(),
                RepositoryError::Backend(_) => "internal server error".to_owned(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Repository(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Repository error: not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::EmptyCart.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::InvalidLogin.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("dup".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::Timeout(Duration::from_secs(3)).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(RepositoryError::backend("disk on fire").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(RepositoryError::QuantityOverflow.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::MissingCredentials.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::Repository(RepositoryError::InvalidLogin).into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_backend_detail_is_hidden() {
        let (status, body) = body_of(RepositoryError::backend("secret table name").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "internal server error"}));
    }

    #[tokio::test]
    async fn test_invalid_login_body() {
        let (_, body) = body_of(AuthError::Repository(RepositoryError::InvalidLogin).into()).await;
        assert_eq!(body, serde_json::json!({"error": "invalid credentials"}));
    }
}
