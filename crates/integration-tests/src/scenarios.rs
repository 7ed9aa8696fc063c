//! Storage scenarios shared by every backend.
//!
//! Each function builds its own state from empty repositories and asserts on
//! observable behavior only, so the same suite proves both backends agree.

use std::sync::Arc;

use bazaar_core::{
    Cart, CartItem, Product, ProductId, RepositoryError, User, UserId, cart,
};
use bazaar_storefront::state::Repositories;

fn item(product: i64, quantity: i64, price: f64) -> CartItem {
    CartItem::new(ProductId::new(product), quantity, price)
}

/// Ids start at 1, increase, and are not reused after delete.
pub async fn id_assignment(repos: &Repositories) {
    let a = repos
        .users
        .create(User::new("A", "a@example.com", "pw"))
        .await
        .unwrap();
    let b = repos
        .users
        .create(User::new("B", "b@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!((a.id, b.id), (UserId::new(1), UserId::new(2)));

    let first = repos
        .products
        .create(Product::new("Pen", 1.0, "stationery"))
        .await
        .unwrap();
    repos.products.delete(first.id).await.unwrap();
    let second = repos
        .products
        .create(Product::new("Pad", 2.0, "stationery"))
        .await
        .unwrap();
    assert_eq!(first.id, ProductId::new(1));
    assert_eq!(second.id, ProductId::new(2));

    let names: Vec<String> = repos
        .users
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

/// Unknown ids fail with `NotFound` and leave the store unchanged.
pub async fn not_found_conditions(repos: &Repositories) {
    let pen = repos
        .products
        .create(Product::new("Pen", 1.0, "stationery"))
        .await
        .unwrap();

    let mut ghost = Product::new("Ghost", 9.0, "none");
    ghost.id = ProductId::new(99);
    assert!(matches!(
        repos.products.update(ghost).await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert!(matches!(
        repos.products.delete(ProductId::new(99)).await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert!(matches!(
        repos.products.get_by_id(ProductId::new(99)).await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert_eq!(repos.products.list_all().await.unwrap(), vec![pen]);

    let mut ghost = User::new("Ghost", "ghost@example.com", "pw");
    ghost.id = UserId::new(5);
    assert!(matches!(
        repos.users.update(ghost).await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert!(matches!(
        repos.users.get_by_email("ghost@example.com").await.unwrap_err(),
        RepositoryError::NotFound
    ));
    assert!(repos.users.list_all().await.unwrap().is_empty());
}

/// Emails are unique on create and on update.
pub async fn email_uniqueness(repos: &Repositories) {
    repos
        .users
        .create(User::new("A", "a@example.com", "pw"))
        .await
        .unwrap();
    let mut b = repos
        .users
        .create(User::new("B", "b@example.com", "pw"))
        .await
        .unwrap();

    assert!(matches!(
        repos
            .users
            .create(User::new("A2", "a@example.com", "pw"))
            .await
            .unwrap_err(),
        RepositoryError::Conflict(_)
    ));

    b.email = "a@example.com".to_owned();
    assert!(matches!(
        repos.users.update(b).await.unwrap_err(),
        RepositoryError::Conflict(_)
    ));
    assert_eq!(
        repos.users.get_by_id(UserId::new(2)).await.unwrap().email,
        "b@example.com"
    );
}

/// Re-adding a product increments one line; a new user has an empty cart.
pub async fn cart_aggregation(repos: &Repositories) {
    let user = UserId::new(1);
    assert_eq!(
        repos.carts.get_cart(user).await.unwrap(),
        Cart::empty(user)
    );

    repos.carts.add_item(user, item(1, 2, 10.0)).await.unwrap();
    repos.carts.add_item(user, item(1, 3, 10.0)).await.unwrap();

    let cart = repos.carts.get_cart(user).await.unwrap();
    assert_eq!(cart.items, vec![item(1, 5, 10.0)]);

    let total = cart::checkout(repos.carts.as_ref(), user).await.unwrap();
    assert!((total - 50.0).abs() < f64::EPSILON);
    assert!(repos.carts.get_cart(user).await.unwrap().is_empty());
}

/// Two distinct lines sum to 25.5.
pub async fn cart_subtotal(repos: &Repositories) {
    let user = UserId::new(3);
    repos.carts.add_item(user, item(1, 2, 10.0)).await.unwrap();
    repos.carts.add_item(user, item(2, 1, 5.5)).await.unwrap();

    let cart = repos.carts.get_cart(user).await.unwrap();
    assert!((cart::subtotal(&cart) - 25.5).abs() < f64::EPSILON);
}

/// Checkout of an empty cart fails and changes nothing.
pub async fn empty_checkout(repos: &Repositories) {
    let user = UserId::new(8);
    assert!(matches!(
        cart::checkout(repos.carts.as_ref(), user).await.unwrap_err(),
        RepositoryError::EmptyCart
    ));
    assert!(repos.carts.get_cart(user).await.unwrap().is_empty());

    // Another user's cart is untouched
    repos
        .carts
        .add_item(UserId::new(9), item(1, 1, 1.0))
        .await
        .unwrap();
    assert!(cart::checkout(repos.carts.as_ref(), user).await.is_err());
    assert_eq!(
        repos.carts.get_cart(UserId::new(9)).await.unwrap().items.len(),
        1
    );
}

/// Concurrent adds and checkouts never lose or double-count an item.
pub async fn concurrent_checkout_conserves_items(repos: &Repositories) {
    const ADDS: i64 = 40;
    let user = UserId::new(1);

    let mut adds = Vec::new();
    for _ in 0..ADDS {
        let carts = Arc::clone(&repos.carts);
        adds.push(tokio::spawn(async move {
            carts.add_item(user, item(1, 1, 1.0)).await.unwrap();
        }));
    }

    let mut checkouts = Vec::new();
    for _ in 0..10 {
        let carts = Arc::clone(&repos.carts);
        checkouts.push(tokio::spawn(async move {
            match cart::checkout(carts.as_ref(), user).await {
                Ok(total) => total,
                Err(RepositoryError::EmptyCart) => 0.0,
                Err(e) => panic!("unexpected checkout error: {e}"),
            }
        }));
    }

    for add in adds {
        add.await.unwrap();
    }
    let mut checked_out = 0.0;
    for checkout in checkouts {
        checked_out += checkout.await.unwrap();
    }

    let remaining = cart::subtotal(&repos.carts.get_cart(user).await.unwrap());
    #[allow(clippy::cast_precision_loss)]
    let expected = ADDS as f64;
    assert!((checked_out + remaining - expected).abs() < f64::EPSILON);
}

/// Overflowing a line's quantity fails and leaves the cart usable.
pub async fn quantity_overflow(repos: &Repositories) {
    let user = UserId::new(1);
    repos
        .carts
        .add_item(user, item(1, i64::MAX, 0.5))
        .await
        .unwrap();

    assert!(matches!(
        repos.carts.add_item(user, item(1, 1, 0.5)).await,
        Err(RepositoryError::QuantityOverflow)
    ));

    let cart = repos.carts.get_cart(user).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, i64::MAX);

    repos.carts.add_item(user, item(2, 1, 2.0)).await.unwrap();
    cart::checkout(repos.carts.as_ref(), user).await.unwrap();
    assert!(repos.carts.get_cart(user).await.unwrap().items.is_empty());
}
