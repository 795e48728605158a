//! Mini Shop Core - Shared types library.
//!
//! This crate provides common types used across all Mini Shop components:
//! - `api` - REST service over the document store
//! - `storefront` - Product grid and buy button
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, products, orders, prices and store documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
