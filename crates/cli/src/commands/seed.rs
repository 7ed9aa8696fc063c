//! Seed the product catalog.
//!
//! Products come from a YAML list of `{name, price, category}` entries,
//! either a user-supplied file or the sample catalog compiled into the
//! binary. Seeding goes through `ProductRepository`, so ids are assigned the
//! same way as products created over HTTP.

use std::path::Path;

use bazaar_core::{Product, ProductRepository};
use bazaar_storefront::db::SqlProductRepository;
use serde::Deserialize;

use super::{CommandError, connect};

const SAMPLE_CATALOG: &str = include_str!("../../sample_catalog.yaml");

/// One catalog file entry.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    price: f64,
    #[serde(default)]
    category: String,
}

/// Seed products from `file`, or from the sample catalog.
///
/// Returns the number of products inserted.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry is
/// invalid, or the database fails.
pub async fn run(file: Option<&Path>, force: bool) -> Result<usize, CommandError> {
    let source = match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => SAMPLE_CATALOG.to_owned(),
    };
    let products = parse_catalog(&source)?;
    tracing::info!(products = products.len(), "Parsed catalog");

    let (pool, timeout) = connect().await?;
    let repo = SqlProductRepository::with_timeout(pool.clone(), timeout);
    let inserted = seed_products(&repo, products, force).await;
    pool.close().await;
    inserted
}

/// Parse and validate a YAML catalog.
fn parse_catalog(source: &str) -> Result<Vec<Product>, CommandError> {
    let entries: Vec<CatalogEntry> = serde_yaml::from_str(source)?;

    entries
        .into_iter()
        .map(|entry| {
            if entry.name.trim().is_empty() {
                return Err(CommandError::InvalidProduct(entry.name, "name is empty"));
            }
            if !entry.price.is_finite() || entry.price < 0.0 {
                return Err(CommandError::InvalidProduct(
                    entry.name,
                    "price must be a non-negative number",
                ));
            }
            Ok(Product::new(entry.name, entry.price, entry.category))
        })
        .collect()
}

/// Insert `products` unless the catalog already has some and `force` is off.
async fn seed_products(
    repo: &dyn ProductRepository,
    products: Vec<Product>,
    force: bool,
) -> Result<usize, CommandError> {
    if !force && !repo.list_all().await?.is_empty() {
        tracing::warn!("Catalog already has products, skipping (use --force to seed anyway)");
        return Ok(0);
    }

    let mut inserted = 0;
    for product in products {
        let product = repo.create(product).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "Inserted product");
        inserted += 1;
    }
    Ok(inserted)
}
