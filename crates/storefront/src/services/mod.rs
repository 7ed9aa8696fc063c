//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and plaintext credential login
//!
//! Cart pricing and checkout live in `bazaar_core::cart`.

pub mod auth;
