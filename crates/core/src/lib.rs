//! Bazaar Core - Domain types, storage contracts, and cart logic.
//!
//! This crate is shared by the storefront server, the CLI, and the
//! integration tests:
//! - `storefront` - HTTP API and SQL-backed repositories
//! - `cli` - Schema migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate holds no SQL and no HTTP. Storage is reached only through
//! the repository traits, which the in-memory stores here and the SQL stores
//! in the storefront implement with identical behavior.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs
//! - [`models`] - User, product, and cart records
//! - [`repository`] - Storage traits
//! - [`memory`] - Mutex-guarded in-memory repositories
//! - [`cart`] - Subtotal and checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod types;

pub use error::{BoxError, RepositoryError};
pub use memory::{InMemoryCartRepository, InMemoryProductRepository, InMemoryUserRepository};
pub use models::{Cart, CartItem, Product, User};
pub use repository::{CartRepository, ProductRepository, UserRepository};
pub use types::*;
