//! Seed the Products table from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - id: p1
//!   name: Ceramic Mug
//!   price: 499
//!   image: https://cdn.example.com/mug.png
//! ```
//!
//! Every product is validated before the store is touched, so a bad file
//! writes nothing.

use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use mini_shop_api::config::StoreConfig;
use mini_shop_api::store::connect;
use mini_shop_core::{Product, ProductError};

/// Errors found while reading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Duplicate product id: {0}")]
    Duplicate(String),
}

/// Parse and validate a YAML product list.
///
/// # Errors
///
/// Returns an error if the YAML does not describe a list of products, any
/// product fails validation, or two products share an id.
pub fn parse_products(content: &str) -> Result<Vec<Product>, SeedError> {
    let products: Vec<Product> = serde_yaml::from_str(content)?;

    let errors: Vec<ProductError> = products
        .iter()
        .filter_map(|product| product.validate().err())
        .collect();
    if !errors.is_empty() {
        error!("Product validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let mut seen = std::collections::HashSet::new();
    for product in &products {
        if !seen.insert(product.id.as_str()) {
            return Err(SeedError::Duplicate(product.id.to_string()));
        }
    }

    Ok(products)
}

/// Seed products from a YAML file into the configured store.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, configuration is
/// invalid, or a write fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::NotFound(file_path.to_string()).into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await.map_err(SeedError::from)?;
    let products = parse_products(&content)?;
    info!(count = products.len(), "Products validated");

    let config = StoreConfig::from_env()?;
    let store = connect(&config).await?;

    for product in &products {
        store.put(&config.products, product.to_document()?).await?;
        info!(id = %product.id, name = %product.name, "Seeded product");
    }

    info!(
        table = %config.products.name,
        count = products.len(),
        "Seeding complete!"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let products = parse_products(
            "- id: p1\n  name: Mug\n  price: 499.5\n  image: https://cdn.example.com/mug.png\n\
             - id: p2\n  name: Tee\n  price: 799\n  image: https://cdn.example.com/tee.png\n",
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price().display(), "₹499.50");
    }

    #[test]
    fn test_rejects_negative_price() {
        let err = parse_products("- id: p1\n  name: Mug\n  price: -1\n  image: x.png\n").err();
        assert!(matches!(err, Some(SeedError::Invalid(1))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = parse_products(
            "- id: p1\n  name: Mug\n  price: 1\n  image: a.png\n\
             - id: p1\n  name: Cup\n  price: 2\n  image: b.png\n",
        )
        .err();
        assert!(matches!(err, Some(SeedError::Duplicate(id)) if id == "p1"));
    }
}
