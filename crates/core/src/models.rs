//! Domain records shared by every repository backend.
//!
//! These are plain data types. Behavior lives in [`crate::cart`] and in the
//! repository implementations.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UserId};

/// A registered user.
///
/// The password is held in plaintext only while the record travels between
/// the HTTP layer and the store. It is never serialized and `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct User {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address; unique across all users.
    pub email: String,
    /// Plaintext password.
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl User {
    /// Create an unsaved user. The store assigns the id on `create`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::default(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Product {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price; expected to be non-negative.
    pub price: f64,
    /// Free-text category label.
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Create an unsaved product.
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self {
            id: ProductId::default(),
            name: name.into(),
            price,
            category: category.into(),
        }
    }
}

/// One line of a cart.
///
/// `price` is the unit price captured when the item was first added; it is
/// not re-read from the product afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Referenced product.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: i64,
    /// Unit price snapshot.
    pub price: f64,
}

impl CartItem {
    /// Create a cart item.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: i64, price: f64) -> Self {
        Self {
            product_id,
            quantity,
            price,
        }
    }
}

/// All pending items for one user, in the order they were first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Owning user.
    pub user_id: UserId,
    /// Cart lines, at most one per product.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart for `user_id`.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Returns `true` if the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
