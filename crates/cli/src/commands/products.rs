//! Product catalog inspection.

use tracing::info;

use mini_shop_api::config::StoreConfig;
use mini_shop_api::store::{connect, scan_all};

/// Log every item in the Products table.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the scan fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    let store = connect(&config).await?;

    let items = scan_all(store.as_ref(), &config.products, config.page_size).await?;

    info!(table = %config.products.name, count = items.len(), "Products");
    for item in items {
        info!("  {}", serde_json::Value::Object(item));
    }

    Ok(())
}
