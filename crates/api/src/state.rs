//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::store::{DocumentStore, Table};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and carries the document store
/// handle constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// The Products table.
    #[must_use]
    pub fn products_table(&self) -> &Table {
        &self.inner.config.store.products
    }

    /// The Orders table.
    #[must_use]
    pub fn orders_table(&self) -> &Table {
        &self.inner.config.store.orders
    }
}
