//! User repository for database operations.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{RepositoryError, User, UserId, UserRepository};
use sqlx::SqlitePool;
use tracing::instrument;

use super::{DEFAULT_OPERATION_TIMEOUT, bounded, db_error};

const EMAIL_CONFLICT: &str = "email already exists";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            password: row.password,
        }
    }
}

/// [`UserRepository`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct SqlUserRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqlUserRepository {
    /// Create a new user repository with the default per-call timeout.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_timeout(pool, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Create a new user repository with a custom per-call timeout.
    #[must_use]
    pub fn with_timeout(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    #[instrument(level = "debug", skip_all, fields(email = %user.email), err)]
    async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        bounded(self.timeout, async {
            let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(e, EMAIL_CONFLICT))?;

            user.id = UserId::new(result.last_insert_rowid());
            Ok::<_, RepositoryError>(user)
        })
        .await
    }

    #[instrument(level = "debug", skip_all, fields(user_id = %user.id), err)]
    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        bounded(self.timeout, async {
            let result =
                sqlx::query("UPDATE users SET name = ?, email = ?, password = ? WHERE id = ?")
                    .bind(&user.name)
                    .bind(&user.email)
                    .bind(&user.password)
                    .bind(user.id.as_i64())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| db_error(e, EMAIL_CONFLICT))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(user)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        bounded(self.timeout, async {
            let rows = sqlx::query_as::<_, UserRow>(
                "SELECT id, name, email, password FROM users ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(e, EMAIL_CONFLICT))?;

            Ok::<_, RepositoryError>(rows.into_iter().map(User::from).collect())
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query_as::<_, UserRow>(
                "SELECT id, name, email, password FROM users WHERE email = ?",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, EMAIL_CONFLICT))?
            .map(User::from)
            .ok_or(RepositoryError::NotFound)
        })
        .await
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query_as::<_, UserRow>(
                "SELECT id, name, email, password FROM users WHERE id = ?",
            )
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, EMAIL_CONFLICT))?
            .map(User::from)
            .ok_or(RepositoryError::NotFound)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::tests::memory_pool;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = SqlUserRepository::new(memory_pool().await);
        let a = repo
            .create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();
        let b = repo
            .create(User::new("B", "b@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(a.id, UserId::new(1));
        assert_eq!(b.id, UserId::new(2));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = SqlUserRepository::new(memory_pool().await);
        repo.create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();

        let err = repo
            .create(User::new("A2", "a@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref msg) if msg == EMAIL_CONFLICT));
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let repo = SqlUserRepository::new(memory_pool().await);
        let mut ghost = User::new("Ghost", "ghost@example.com", "pw");
        ghost.id = UserId::new(9);

        assert!(matches!(
            repo.update(ghost).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_lookup() {
        let repo = SqlUserRepository::new(memory_pool().await);
        let mut user = repo
            .create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();
        user.email = "alice@example.com".to_owned();
        repo.update(user.clone()).await.unwrap();

        let by_email = repo.get_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email, user);
        assert!(matches!(
            repo.get_by_email("a@example.com").await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert_eq!(repo.get_by_id(user.id).await.unwrap().password, "pw");
    }

    #[tokio::test]
    async fn test_operation_times_out() {
        let repo = SqlUserRepository::with_timeout(memory_pool().await, Duration::ZERO);

        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Timeout(_)));
    }
}
