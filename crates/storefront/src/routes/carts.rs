//! Cart route handlers.
//!
//! Carts are addressed by user id and created on first add. Each line keeps
//! the unit price the product had when it was first added.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use bazaar_core::{Cart, CartItem, ProductId, UserId, cart};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the carts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carts/{user_id}", get(show).delete(clear))
        .route("/carts/{user_id}/items", post(add_item))
        .route("/carts/{user_id}/checkout", post(checkout))
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Cart with its current subtotal.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            subtotal: cart::subtotal(&cart),
            user_id: cart.user_id,
            items: cart.items,
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub user_id: UserId,
    pub total: f64,
}

/// Show a user's cart.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().get_cart(user_id).await?;
    Ok(Json(cart.into()))
}

/// Add a product to a user's cart at its current price.
///
/// # Errors
///
/// 400 if quantity is not positive, 404 if the product does not exist.
pub async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_owned()));
    }

    let product = state.products().get_by_id(body.product_id).await?;
    state
        .carts()
        .add_item(user_id, CartItem::new(product.id, body.quantity, product.price))
        .await?;

    let cart = state.carts().get_cart(user_id).await?;
    Ok(Json(cart.into()))
}

/// Empty a user's cart.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    state.carts().clear_cart(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check out a user's cart.
///
/// # Errors
///
/// 409 if the cart is empty.
pub async fn checkout(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<CheckoutResponse>> {
    let total = cart::checkout(state.carts(), user_id).await?;
    Ok(Json(CheckoutResponse { user_id, total }))
}
