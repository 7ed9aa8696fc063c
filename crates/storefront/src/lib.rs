//! Bazaar Storefront library.
//!
//! This crate provides the HTTP API and the SQL-backed repositories as a
//! library, so the server binary, the CLI, and the integration tests share
//! one router and one schema.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
