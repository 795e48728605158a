//! Core types for Mini Shop.
//!
//! This module provides type-safe wrappers for the shop's domain concepts.

pub mod document;
pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use document::{Document, string_attribute};
pub use id::*;
pub use order::{ORDER_CREATED_MESSAGE, Order, OrderAck, OrderError, OrderRequest};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductError};
