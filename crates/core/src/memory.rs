//! In-memory repositories.
//!
//! Each repository owns its state behind a single mutex. Every call holds the
//! lock for its whole duration, so each call is atomic; nothing is shared
//! between instances. Reads hand out clones, never references into the state.
//!
//! Ids come from a per-repository counter that starts at 1 and is never
//! reused, even after a delete.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{RepositoryError, Result};
use crate::models::{Cart, CartItem, Product, User};
use crate::repository::{CartRepository, ProductRepository, UserRepository};
use crate::types::{ProductId, UserId};

/// Rows keyed by id plus the id counter.
#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::backend("in-memory store lock poisoned"))
}

// =============================================================================
// Users
// =============================================================================

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Mutex<Table<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(table: &Table<User>, email: &str, except: Option<i64>) -> bool {
    table
        .rows
        .iter()
        .any(|(id, u)| Some(*id) != except && u.email == email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> Result<User> {
        let mut table = lock(&self.state)?;

        if email_taken(&table, &user.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        user.id = UserId::new(table.next_id());
        table.rows.insert(user.id.as_i64(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User> {
        let mut table = lock(&self.state)?;
        let id = user.id.as_i64();

        if !table.rows.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if email_taken(&table, &user.email, Some(id)) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let table = lock(&self.state)?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_by_email(&self, email: &str) -> Result<User> {
        let table = lock(&self.state)?;
        table
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User> {
        let table = lock(&self.state)?;
        table
            .rows
            .get(&id.as_i64())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

// =============================================================================
// Products
// =============================================================================

/// In-memory [`ProductRepository`].
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    state: Mutex<Table<Product>>,
}

impl InMemoryProductRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, mut product: Product) -> Result<Product> {
        let mut table = lock(&self.state)?;
        product.id = ProductId::new(table.next_id());
        table.rows.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product> {
        let mut table = lock(&self.state)?;
        let Some(row) = table.rows.get_mut(&product.id.as_i64()) else {
            return Err(RepositoryError::NotFound);
        };
        row.clone_from(&product);
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let mut table = lock(&self.state)?;
        table
            .rows
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Product>> {
        let table = lock(&self.state)?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product> {
        let table = lock(&self.state)?;
        table
            .rows
            .get(&id.as_i64())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

// =============================================================================
// Carts
// =============================================================================

/// In-memory [`CartRepository`].
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: Mutex<HashMap<UserId, Vec<CartItem>>>,
}

impl InMemoryCartRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn add_item(&self, user_id: UserId, item: CartItem) -> Result<()> {
        let mut carts = lock(&self.carts)?;
        let items = carts.entry(user_id).or_default();

        match items.iter_mut().find(|it| it.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(RepositoryError::QuantityOverflow)?;
            }
            None => items.push(item),
        }
        Ok(())
    }

    async fn get_cart(&self, user_id: UserId) -> Result<Cart> {
        let carts = lock(&self.carts)?;
        let items = carts.get(&user_id).cloned().unwrap_or_default();
        Ok(Cart { user_id, items })
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let mut carts = lock(&self.carts)?;
        carts.remove(&user_id);
        Ok(())
    }

    async fn take_cart(&self, user_id: UserId) -> Result<Cart> {
        let mut carts = lock(&self.carts)?;
        let items = carts.remove(&user_id).unwrap_or_default();
        Ok(Cart { user_id, items })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_ids_start_at_one_and_increase() {
        let repo = InMemoryUserRepository::new();
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
    async fn test_create_user_ignores_incoming_id() {
        let repo = InMemoryUserRepository::new();
        let mut user = User::new("A", "a@example.com", "pw");
        user.id = UserId::new(99);

        let created = repo.create(user).await.unwrap();
        assert_eq!(created.id, UserId::new(1));
        assert!(repo.get_by_id(UserId::new(99)).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();

        let err = repo
            .create(User::new("A2", "a@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let mut ghost = User::new("Ghost", "ghost@example.com", "pw");
        ghost.id = UserId::new(5);

        let err = repo.update(ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user_may_keep_own_email() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo
            .create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();
        user.name = "Alice".to_owned();

        let updated = repo.update(user).await.unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(
            repo.get_by_email("a@example.com").await.unwrap().name,
            "Alice"
        );
    }

    #[tokio::test]
    async fn test_update_user_to_taken_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();
        let mut b = repo
            .create(User::new("B", "b@example.com", "pw"))
            .await
            .unwrap();
        b.email = "a@example.com".to_owned();

        let err = repo.update(b).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(
            repo.get_by_id(UserId::new(2)).await.unwrap().email,
            "b@example.com"
        );
    }

    #[tokio::test]
    async fn test_get_by_email_missing_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_returned_user_is_a_copy() {
        let repo = InMemoryUserRepository::new();
        let mut created = repo
            .create(User::new("A", "a@example.com", "pw"))
            .await
            .unwrap();
        created.name = "mutated".to_owned();

        assert_eq!(repo.get_by_id(created.id).await.unwrap().name, "A");
    }

    #[tokio::test]
    async fn test_product_delete_and_ids_not_reused() {
        let repo = InMemoryProductRepository::new();
        let first = repo
            .create(Product::new("Mug", 8.5, "kitchen"))
            .await
            .unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo
            .create(Product::new("Bowl", 12.0, "kitchen"))
            .await
            .unwrap();
        assert_eq!(second.id, ProductId::new(2));
        assert!(matches!(
            repo.get_by_id(first.id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_product_update_and_delete_unknown_are_not_found() {
        let repo = InMemoryProductRepository::new();
        repo.create(Product::new("Mug", 8.5, "kitchen"))
            .await
            .unwrap();

        let mut ghost = Product::new("Ghost", 1.0, "none");
        ghost.id = ProductId::new(42);
        assert!(matches!(
            repo.update(ghost).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            repo.delete(ProductId::new(42)).await.unwrap_err(),
            RepositoryError::NotFound
        ));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.first().unwrap().name, "Mug");
    }

    #[tokio::test]
    async fn test_product_list_is_ordered_by_id() {
        let repo = InMemoryProductRepository::new();
        for name in ["a", "b", "c"] {
            repo.create(Product::new(name, 1.0, "x")).await.unwrap();
        }
        let ids: Vec<i64> = repo
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_same_product_merges_quantity() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.add_item(user, CartItem::new(ProductId::new(1), 2, 10.0))
            .await
            .unwrap();
        repo.add_item(user, CartItem::new(ProductId::new(1), 3, 12.0))
            .await
            .unwrap();

        let cart = repo.get_cart(user).await.unwrap();
        assert_eq!(cart.items, vec![CartItem::new(ProductId::new(1), 5, 10.0)]);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let repo = InMemoryCartRepository::new();
        repo.add_item(UserId::new(1), CartItem::new(ProductId::new(1), 1, 1.0))
            .await
            .unwrap();

        assert!(repo.get_cart(UserId::new(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_cart_returns_independent_copy() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.add_item(user, CartItem::new(ProductId::new(1), 1, 4.0))
            .await
            .unwrap();

        let mut copy = repo.get_cart(user).await.unwrap();
        copy.items.clear();

        assert_eq!(repo.get_cart(user).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_cart_is_idempotent() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.clear_cart(user).await.unwrap();
        repo.add_item(user, CartItem::new(ProductId::new(1), 1, 4.0))
            .await
            .unwrap();
        repo.clear_cart(user).await.unwrap();
        repo.clear_cart(user).await.unwrap();

        assert!(repo.get_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_take_cart_returns_items_and_empties() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.add_item(user, CartItem::new(ProductId::new(1), 2, 3.0))
            .await
            .unwrap();

        let taken = repo.take_cart(user).await.unwrap();
        assert_eq!(taken.items.len(), 1);
        assert!(repo.get_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quantity_overflow_is_rejected_without_change() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.add_item(user, CartItem::new(ProductId::new(1), i64::MAX, 1.0))
            .await
            .unwrap();

        let err = repo
            .add_item(user, CartItem::new(ProductId::new(1), 1, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::QuantityOverflow));

        // Store still usable, line unchanged
        let cart = repo.get_cart(user).await.unwrap();
        assert_eq!(
            cart.items,
            vec![CartItem::new(ProductId::new(1), i64::MAX, 1.0)]
        );
        repo.add_item(UserId::new(2), CartItem::new(ProductId::new(1), 1, 1.0))
            .await
            .unwrap();
    }
}
