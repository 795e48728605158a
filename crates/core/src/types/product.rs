//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::Document;
use super::id::{IdError, ProductId};
use super::price::{CurrencyCode, Price};

/// Errors found when checking a product before it is written to the store.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("invalid product id: {0}")]
    InvalidId(#[from] IdError),
    #[error("product {0} has an empty name")]
    EmptyName(String),
    #[error("product {0} has a negative price")]
    NegativePrice(String),
    #[error("product {0} could not be encoded: {1}")]
    Encode(String, String),
}

/// A product as stored in the Products table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

impl Product {
    /// Price in the shop currency.
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::new(self.price, CurrencyCode::INR)
    }

    /// Check the fields a seeded product must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a blank or overlong id, an empty
    /// name, or a negative price.
    pub fn validate(&self) -> Result<(), ProductError> {
        ProductId::parse(self.id.as_str())?;
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName(self.id.to_string()));
        }
        if self.price.is_sign_negative() {
            return Err(ProductError::NegativePrice(self.id.to_string()));
        }
        Ok(())
    }

    /// Convert into a store document.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Encode` if the price cannot be represented as a
    /// JSON number.
    pub fn to_document(&self) -> Result<Document, ProductError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(ProductError::Encode(
                self.id.to_string(),
                format!("expected object, got {other}"),
            )),
            Err(e) => Err(ProductError::Encode(self.id.to_string(), e.to_string())),
        }
    }
}
