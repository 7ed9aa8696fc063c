//! Authentication service.
//!
//! Credentials are compared in plaintext. A failed login never reveals
//! whether the email exists: unknown email and wrong password both yield
//! `RepositoryError::InvalidLogin`.

mod error;

pub use error::AuthError;

use bazaar_core::{RepositoryError, User, UserRepository};

/// Authentication service.
///
/// Handles user registration and login on top of any [`UserRepository`].
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if the email or password is empty.
    /// Returns `AuthError::Repository(RepositoryError::Conflict)` if the email
    /// is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self.users.create(User::new(name, email, password)).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify an email/password pair and return the matching user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository(RepositoryError::InvalidLogin)` if the
    /// email is unknown or the password does not match. Other repository
    /// errors are returned unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => return Err(RepositoryError::InvalidLogin.into()),
            Err(e) => return Err(e.into()),
        };

        if user.password != password {
            return Err(RepositoryError::InvalidLogin.into());
        }

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::InMemoryUserRepository;

    use super::*;

    async fn service_with_user(repo: &InMemoryUserRepository) -> User {
        AuthService::new(repo)
            .register("Ada", "ada@example.com", "secret")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_requires_email_and_password() {
        let repo = InMemoryUserRepository::new();
        let auth = AuthService::new(&repo);

        let err = auth
            .register("NoPw", "a@example.com", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let err = auth
            .register("NoEmail", "", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        service_with_user(&repo).await;

        let err = AuthService::new(&repo)
            .register("Other", "ada@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Repository(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_login_success() {
        let repo = InMemoryUserRepository::new();
        let registered = service_with_user(&repo).await;

        let user = AuthService::new(&repo)
            .login("ada@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let repo = InMemoryUserRepository::new();
        service_with_user(&repo).await;
        let auth = AuthService::new(&repo);

        let wrong_password = auth.login("ada@example.com", "nope").await.unwrap_err();
        let unknown_email = auth.login("bob@example.com", "secret").await.unwrap_err();

        assert!(matches!(
            wrong_password,
            AuthError::Repository(RepositoryError::InvalidLogin)
        ));
        assert!(matches!(
            unknown_email,
            AuthError::Repository(RepositoryError::InvalidLogin)
        ));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }
}
