//! Cart repository for database operations.
//!
//! A cart is not stored as its own row; it is the set of `cart_items` rows
//! for one user, in row-id (insertion) order.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{Cart, CartItem, CartRepository, ProductId, RepositoryError, UserId};
use sqlx::SqlitePool;
use tracing::instrument;

use super::{DEFAULT_OPERATION_TIMEOUT, bounded, db_error};

const ITEM_CONFLICT: &str = "cart item already exists";

const SELECT_ITEMS_SQL: &str = r"
    SELECT product_id, quantity, price
    FROM cart_items
    WHERE user_id = ?
    ORDER BY id
";

/// Insert a line or add to the quantity of the existing line. The stored
/// unit price is left untouched on conflict. The guard skips the update when
/// the sum would leave the `i64` range, so no row changes.
const UPSERT_ITEM_SQL: &str = r"
    INSERT INTO cart_items (user_id, product_id, quantity, price)
    VALUES (?, ?, ?, ?)
    ON CONFLICT (user_id, product_id)
    DO UPDATE SET quantity = cart_items.quantity + excluded.quantity
    WHERE cart_items.quantity <= 9223372036854775807 - excluded.quantity
";

const DELETE_ITEMS_SQL: &str = "DELETE FROM cart_items WHERE user_id = ?";

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: i64,
    quantity: i64,
    price: f64,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self::new(ProductId::new(row.product_id), row.quantity, row.price)
    }
}

/// [`CartRepository`] backed by the `cart_items` table.
#[derive(Debug, Clone)]
pub struct SqlCartRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqlCartRepository {
    /// Create a new cart repository with the default per-call timeout.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_timeout(pool, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Create a new cart repository with a custom per-call timeout.
    #[must_use]
    pub fn with_timeout(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl CartRepository for SqlCartRepository {
    #[instrument(level = "debug", skip(self), err)]
    async fn add_item(&self, user_id: UserId, item: CartItem) -> Result<(), RepositoryError> {
        bounded(self.timeout, async {
            let result = sqlx::query(UPSERT_ITEM_SQL)
                .bind(user_id.as_i64())
                .bind(item.product_id.as_i64())
                .bind(item.quantity)
                .bind(item.price)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::QuantityOverflow);
            }

            Ok(())
        })
        .await
    }

    async fn get_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        bounded(self.timeout, async {
            let rows = sqlx::query_as::<_, CartItemRow>(SELECT_ITEMS_SQL)
                .bind(user_id.as_i64())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            Ok::<_, RepositoryError>(Cart {
                user_id,
                items: rows.into_iter().map(CartItem::from).collect(),
            })
        })
        .await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn clear_cart(&self, user_id: UserId) -> Result<(), RepositoryError> {
        bounded(self.timeout, async {
            sqlx::query(DELETE_ITEMS_SQL)
                .bind(user_id.as_i64())
                .execute(&self.pool)
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            Ok::<_, RepositoryError>(())
        })
        .await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn take_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        bounded(self.timeout, async {
            // Take the write lock up front; a deferred transaction would fail
            // with SQLITE_BUSY when upgrading its read lock under contention.
            let mut tx = self
                .pool
                .begin_with("BEGIN IMMEDIATE")
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            let rows = sqlx::query_as::<_, CartItemRow>(SELECT_ITEMS_SQL)
                .bind(user_id.as_i64())
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            if !rows.is_empty() {
                sqlx::query(DELETE_ITEMS_SQL)
                    .bind(user_id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_error(e, ITEM_CONFLICT))?;
            }

            tx.commit()
                .await
                .map_err(|e| db_error(e, ITEM_CONFLICT))?;

            Ok::<_, RepositoryError>(Cart {
                user_id,
                items: rows.into_iter().map(CartItem::from).collect(),
            })
        })
        .await
    }
}
