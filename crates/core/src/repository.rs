//! Storage contracts for users, products, and carts.
//!
//! Each trait has two interchangeable implementations with identical
//! observable behavior: the in-memory stores in [`crate::memory`] and the
//! SQL stores in the storefront crate. Handlers and domain logic only ever
//! see `dyn` trait objects, so the backend is chosen once at startup.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Cart, CartItem, Product, User};
use crate::types::{ProductId, UserId};

/// User storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user and return it with its assigned id.
    ///
    /// Any id on the input is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: User) -> Result<User>;

    /// Replace the user with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that id, or
    /// `RepositoryError::Conflict` if the email belongs to another user.
    async fn update(&self, user: User) -> Result<User>;

    /// All users, ordered by id.
    async fn list_all(&self) -> Result<Vec<User>>;

    /// Look up a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    async fn get_by_email(&self, email: &str) -> Result<User>;

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that id.
    async fn get_by_id(&self, id: UserId) -> Result<User>;
}

/// Product catalog storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a new product and return it with its assigned id.
    async fn create(&self, product: Product) -> Result<Product>;

    /// Replace the product with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that id.
    async fn update(&self, product: Product) -> Result<Product>;

    /// Permanently remove a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that id.
    async fn delete(&self, id: ProductId) -> Result<()>;

    /// All products, ordered by id.
    async fn list_all(&self) -> Result<Vec<Product>>;

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that id.
    async fn get_by_id(&self, id: ProductId) -> Result<Product>;
}

/// Cart storage, keyed by user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Add `item` to the user's cart.
    ///
    /// If the cart already has a line for the same product, its quantity is
    /// increased by `item.quantity` and its unit price is left as is.
    /// Otherwise the item is appended.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::QuantityOverflow`, leaving the cart
    /// unchanged, if the merged quantity would not fit in an `i64`.
    async fn add_item(&self, user_id: UserId, item: CartItem) -> Result<()>;

    /// The user's cart, or an empty cart if the user has no items.
    async fn get_cart(&self, user_id: UserId) -> Result<Cart>;

    /// Remove every item from the user's cart. Succeeds if there is none.
    async fn clear_cart(&self, user_id: UserId) -> Result<()>;

    /// Return the user's cart and remove its items as one atomic step.
    ///
    /// No concurrent `add_item` can land between the read and the removal.
    /// An empty cart is returned unchanged.
    async fn take_cart(&self, user_id: UserId) -> Result<Cart>;
}
