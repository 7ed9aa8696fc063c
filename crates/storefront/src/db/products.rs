//! Product repository for database operations.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{Product, ProductId, ProductRepository, RepositoryError};
use sqlx::SqlitePool;
use tracing::instrument;

use super::{DEFAULT_OPERATION_TIMEOUT, bounded, db_error};

const PRODUCT_CONFLICT: &str = "product already exists";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: f64,
    category: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            category: row.category,
        }
    }
}

/// [`ProductRepository`] backed by the `products` table.
#[derive(Debug, Clone)]
pub struct SqlProductRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqlProductRepository {
    /// Create a new product repository with the default per-call timeout.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_timeout(pool, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Create a new product repository with a custom per-call timeout.
    #[must_use]
    pub fn with_timeout(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    #[instrument(level = "debug", skip_all, fields(name = %product.name), err)]
    async fn create(&self, mut product: Product) -> Result<Product, RepositoryError> {
        bounded(self.timeout, async {
            let result =
                sqlx::query("INSERT INTO products (name, price, category) VALUES (?, ?, ?)")
                    .bind(&product.name)
                    .bind(product.price)
                    .bind(&product.category)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| db_error(e, PRODUCT_CONFLICT))?;

            product.id = ProductId::new(result.last_insert_rowid());
            Ok::<_, RepositoryError>(product)
        })
        .await
    }

    #[instrument(level = "debug", skip_all, fields(product_id = %product.id), err)]
    async fn update(&self, product: Product) -> Result<Product, RepositoryError> {
        bounded(self.timeout, async {
            let result =
                sqlx::query("UPDATE products SET name = ?, price = ?, category = ? WHERE id = ?")
                    .bind(&product.name)
                    .bind(product.price)
                    .bind(&product.category)
                    .bind(product.id.as_i64())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| db_error(e, PRODUCT_CONFLICT))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(product)
        })
        .await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        bounded(self.timeout, async {
            let result = sqlx::query("DELETE FROM products WHERE id = ?")
                .bind(id.as_i64())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(e, PRODUCT_CONFLICT))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        bounded(self.timeout, async {
            let rows = sqlx::query_as::<_, ProductRow>(
                "SELECT id, name, price, category FROM products ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(e, PRODUCT_CONFLICT))?;

            Ok::<_, RepositoryError>(rows.into_iter().map(Product::from).collect())
        })
        .await
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product, RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query_as::<_, ProductRow>(
                "SELECT id, name, price, category FROM products WHERE id = ?",
            )
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, PRODUCT_CONFLICT))?
            .map(Product::from)
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
    async fn test_crud_round() {
        let repo = SqlProductRepository::new(memory_pool().await);
        let mut mug = repo
            .create(Product::new("Mug", 8.5, "kitchen"))
            .await
            .unwrap();
        assert_eq!(mug.id, ProductId::new(1));

        mug.price = 9.0;
        repo.update(mug.clone()).await.unwrap();
        assert_eq!(repo.get_by_id(mug.id).await.unwrap(), mug);

        repo.delete(mug.id).await.unwrap();
        assert!(matches!(
            repo.get_by_id(mug.id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let repo = SqlProductRepository::new(memory_pool().await);
        let mut ghost = Product::new("Ghost", 1.0, "none");
        ghost.id = ProductId::new(3);

        assert!(matches!(
            repo.update(ghost).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            repo.delete(ProductId::new(3)).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = SqlProductRepository::new(memory_pool().await);
        let first = repo.create(Product::new("A", 1.0, "x")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.create(Product::new("B", 1.0, "x")).await.unwrap();
        assert_eq!(second.id, ProductId::new(2));
    }
}
