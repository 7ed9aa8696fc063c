//! Product catalog handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use bazaar_core::{Product, ProductId};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Create/replace request body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
}

impl ProductRequest {
    fn into_product(self) -> Result<Product> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_owned()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::BadRequest(
                "price must be a non-negative number".to_owned(),
            ));
        }
        Ok(Product::new(self.name, self.price, self.category))
    }
}

/// List the catalog.
///
/// # Errors
///
/// Returns an error if the repository fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list_all().await?))
}

/// Add a product.
///
/// # Errors
///
/// 400 if the name is empty or the price negative.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products().create(body.into_product()?).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Show a single product.
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.products().get_by_id(id).await?))
}

/// Replace a product.
///
/// # Errors
///
/// 400 on invalid fields, 404 if the product does not exist.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<Product>> {
    let mut product = body.into_product()?;
    product.id = id;
    Ok(Json(state.products().update(product).await?))
}

/// Delete a product. Carts holding it keep their snapshot lines.
///
/// # Errors
///
/// 404 if the product does not exist.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.products().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
