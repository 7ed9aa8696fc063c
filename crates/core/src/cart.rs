//! Cart pricing and checkout.
//!
//! This is the only business logic in the system. It runs against any
//! [`CartRepository`], so it exists once regardless of the storage backend.

use crate::error::{RepositoryError, Result};
use crate::models::Cart;
use crate::repository::CartRepository;
use crate::types::UserId;

/// Sum of unit price × quantity over all items, accumulated in item order.
#[must_use]
pub fn subtotal(cart: &Cart) -> f64 {
    cart.items.iter().fold(0.0, |total, item| {
        #[allow(clippy::cast_precision_loss)] // Quantities never approach 2^53
        let quantity = item.quantity as f64;
        total + item.price * quantity
    })
}

/// Check out the user's cart: return its subtotal and leave it empty.
///
/// The cart is read and emptied by a single [`CartRepository::take_cart`]
/// call, so an item added concurrently either makes it into this checkout or
/// stays in the cart for the next one.
///
/// # Errors
///
/// Returns `RepositoryError::EmptyCart` if the cart has no items (nothing is
/// modified). Store errors are returned unchanged.
pub async fn checkout(carts: &dyn CartRepository, user_id: UserId) -> Result<f64> {
    let cart = carts.take_cart(user_id).await?;

    if cart.is_empty() {
        return Err(RepositoryError::EmptyCart);
    }

    let total = subtotal(&cart);
    tracing::info!(%user_id, items = cart.items.len(), total, "Cart checked out");
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCartRepository;
    use crate::models::CartItem;
    use crate::repository::MockCartRepository;
    use crate::types::ProductId;

    fn item(product: i64, quantity: i64, price: f64) -> CartItem {
        CartItem::new(ProductId::new(product), quantity, price)
    }

    #[test]
    fn test_subtotal_two_lines() {
        let cart = Cart {
            user_id: UserId::new(1),
            items: vec![item(1, 2, 10.0), item(2, 1, 5.5)],
        };
        assert_eq!(subtotal(&cart), 25.5);
    }

    #[test]
    fn test_subtotal_empty_cart_is_zero() {
        assert_eq!(subtotal(&Cart::empty(UserId::new(1))), 0.0);
    }

    #[test]
    fn test_subtotal_accumulates_in_item_order() {
        let items = vec![item(1, 3, 0.1), item(2, 7, 0.2), item(3, 1, 1e16)];
        let expected = 0.0 + 0.1 * 3.0 + 0.2 * 7.0 + 1e16 * 1.0;
        let cart = Cart {
            user_id: UserId::new(1),
            items,
        };
        assert_eq!(subtotal(&cart), expected);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let repo = InMemoryCartRepository::new();

        let err = checkout(&repo, UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::EmptyCart));
        assert!(repo.get_cart(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_returns_total_and_empties_cart() {
        let repo = InMemoryCartRepository::new();
        let user = UserId::new(1);
        repo.add_item(user, item(1, 2, 10.0)).await.unwrap();
        repo.add_item(user, item(1, 3, 10.0)).await.unwrap();

        let total = checkout(&repo, user).await.unwrap();
        assert_eq!(total, 50.0);
        assert!(repo.get_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_leaves_other_users_alone() {
        let repo = InMemoryCartRepository::new();
        repo.add_item(UserId::new(1), item(1, 1, 2.0))
            .await
            .unwrap();
        repo.add_item(UserId::new(2), item(1, 1, 2.0))
            .await
            .unwrap();

        checkout(&repo, UserId::new(1)).await.unwrap();
        assert_eq!(repo.get_cart(UserId::new(2)).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_propagates_store_error() {
        let mut repo = MockCartRepository::new();
        repo.expect_take_cart()
            .times(1)
            .returning(|_| Err(RepositoryError::backend("disk on fire")));

        let err = checkout(&repo, UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Backend(_)));
    }

    #[tokio::test]
    async fn test_checkout_propagates_timeout() {
        let mut repo = MockCartRepository::new();
        repo.expect_take_cart().returning(|_| {
            Err(RepositoryError::Timeout(std::time::Duration::from_secs(3)))
        });

        let err = checkout(&repo, UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_checkout_uses_single_atomic_take() {
        let mut repo = MockCartRepository::new();
        repo.expect_take_cart().times(1).returning(|user_id| {
            Ok(Cart {
                user_id,
                items: vec![item(1, 2, 10.0), item(2, 1, 5.5)],
            })
        });
        repo.expect_get_cart().never();
        repo.expect_clear_cart().never();

        assert_eq!(checkout(&repo, UserId::new(1)).await.unwrap(), 25.5);
    }
}
