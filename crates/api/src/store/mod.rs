//! Document store access.
//!
//! # Backends
//!
//! - [`DynamoStore`] - Amazon DynamoDB (scan / get / put item)
//! - [`PostgresStore`] - `PostgreSQL` JSONB table (`store.document`)
//! - [`MemoryStore`] - In-process ordered map for tests and local runs
//!
//! Handlers only see `Arc<dyn DocumentStore>`; [`connect`] picks the backend
//! from [`StoreConfig`].
//!
//! # Pagination
//!
//! Scans return one page at a time together with an opaque [`Cursor`] when
//! more items remain. [`scan_all`] follows cursors until the table is
//! exhausted.

mod codec;
mod dynamo;
mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;
use tracing::{debug, info};

use mini_shop_core::Document;

use crate::config::{StoreBackend, StoreConfig};

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;
pub use postgres::{MIGRATOR, PostgresStore, create_pool};

/// Errors returned by document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A DynamoDB request failed.
    #[error("DynamoDB {operation} failed: {message}")]
    Dynamo {
        operation: &'static str,
        message: String,
    },

    /// A `PostgreSQL` query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A pagination cursor could not be decoded.
    #[error("Invalid cursor")]
    InvalidCursor,

    /// The item has no string value under the table's key attribute.
    #[error("Item is missing key attribute '{0}'")]
    MissingKey(String),

    /// A value could not be converted between JSON and the store's format.
    #[error("Codec error: {0}")]
    Codec(String),

    /// The store is not reachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the error was caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCursor)
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A table name together with its partition key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub key: String,
}

impl Table {
    /// Create a table descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Extract this table's key from an item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingKey` if the key attribute is absent or not
    /// a string.
    pub fn key_of<'a>(&self, item: &'a Document) -> Result<&'a str> {
        mini_shop_core::string_attribute(item, &self.key)
            .ok_or_else(|| StoreError::MissingKey(self.key.clone()))
    }
}

/// Opaque continuation token for paginated scans.
///
/// Encodes the last evaluated key as URL-safe base64 of its JSON form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// Encode a last-evaluated key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Codec` if the key cannot be serialized.
    pub fn encode(last_key: &Document) -> Result<Self> {
        let json = serde_json::to_vec(last_key).map_err(|e| StoreError::Codec(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode back into the last-evaluated key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCursor` if the token is not valid base64
    /// JSON object.
    pub fn decode(&self) -> Result<Document> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|_| StoreError::InvalidCursor)?;
        serde_json::from_slice(&bytes).map_err(|_| StoreError::InvalidCursor)
    }

    /// Encode a cursor positioned after `key` in `table`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Codec` if the key cannot be serialized.
    pub fn after_key(table: &Table, key: &str) -> Result<Self> {
        let mut last_key = Document::new();
        last_key.insert(table.key.clone(), serde_json::Value::String(key.to_string()));
        Self::encode(&last_key)
    }

    /// Decode the key a scan of `table` should resume after.
    ///
    /// The decoded object must hold exactly the table's key attribute as a
    /// string.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCursor` for undecodable tokens, objects
    /// without the key attribute and objects carrying other attributes.
    pub fn start_key(&self, table: &Table) -> Result<String> {
        let last_key = self.decode()?;
        if last_key.len() != 1 {
            return Err(StoreError::InvalidCursor);
        }
        table
            .key_of(&last_key)
            .map(str::to_string)
            .map_err(|_| StoreError::InvalidCursor)
    }

    /// Wrap a token received from a client.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token to hand to clients.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameters for a single scan page.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Maximum number of items to return.
    pub limit: u32,
    /// Continue after the key held in this cursor.
    pub cursor: Option<Cursor>,
}

/// One page of scanned items.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<Document>,
    /// Present when more items remain.
    pub next: Option<Cursor>,
}

/// A key-value/document store holding the shop's tables.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Read one page of items from a table.
    async fn scan(&self, table: &Table, request: ScanRequest) -> Result<ScanPage>;

    /// Read a single item by key.
    async fn get(&self, table: &Table, key: &str) -> Result<Option<Document>>;

    /// Write an item unconditionally, replacing any item with the same key.
    async fn put(&self, table: &Table, item: Document) -> Result<()>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;
}

/// Scan a whole table by following cursors until no pages remain.
///
/// # Errors
///
/// Returns the first error reported by the store.
pub async fn scan_all(
    store: &dyn DocumentStore,
    table: &Table,
    page_size: u32,
) -> Result<Vec<Document>> {
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0_u32;

    loop {
        let page = store
            .scan(
                table,
                ScanRequest {
                    limit: page_size,
                    cursor,
                },
            )
            .await?;
        pages += 1;
        items.extend(page.items);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(table = %table.name, pages, items = items.len(), "Scan complete");
    Ok(items)
}

/// Initialize the document store selected by configuration.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialized (for example the
/// `PostgreSQL` pool cannot connect).
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    info!(backend = %config.backend, "Initializing document store");

    match config.backend {
        StoreBackend::DynamoDb => Ok(Arc::new(DynamoStore::new(&config.dynamodb).await)),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;
            let pool = create_pool(url).await?;
            Ok(Arc::new(PostgresStore::new(pool)))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_cursor_round_trip() {
        let key = doc(json!({"id": "p42"}));
        let cursor = Cursor::encode(&key).unwrap();
        assert!(!cursor.as_str().contains('='));
        assert_eq!(Cursor::from_token(cursor.as_str()).decode().unwrap(), key);
    }

    #[test]
    fn test_cursor_rejects_garbage() {
        assert!(matches!(
            Cursor::from_token("not base64 at all!").decode(),
            Err(StoreError::InvalidCursor)
        ));
        let not_object = URL_SAFE_NO_PAD.encode(b"[1,2]");
        assert!(matches!(
            Cursor::from_token(not_object).decode(),
            Err(StoreError::InvalidCursor)
        ));
    }

    #[test]
    fn test_start_key_round_trip() {
        let table = Table::new("Products", "id");
        let cursor = Cursor::after_key(&table, "p42").unwrap();
        assert_eq!(cursor.start_key(&table).unwrap(), "p42");
    }

    #[test]
    fn test_start_key_rejects_non_key_objects() {
        let table = Table::new("Products", "id");
        for value in [
            json!({"foo": 1}),
            json!({}),
            json!({"id": 7}),
            json!({"id": "p1", "name": "Mug"}),
        ] {
            let cursor = Cursor::encode(&doc(value.clone())).unwrap();
            assert!(
                matches!(cursor.start_key(&table), Err(StoreError::InvalidCursor)),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn test_table_key_of() {
        let table = Table::new("Orders", "orderId");
        assert_eq!(table.key_of(&doc(json!({"orderId": "o1"}))).unwrap(), "o1");
        assert!(matches!(
            table.key_of(&doc(json!({"orderId": 7}))),
            Err(StoreError::MissingKey(key)) if key == "orderId"
        ));
    }

    #[tokio::test]
    async fn test_scan_all_follows_cursors() {
        let store = MemoryStore::new();
        let table = Table::new("Products", "id");
        for i in 0..7 {
            store
                .put(&table, doc(json!({"id": format!("p{i}"), "name": "x"})))
                .await
                .unwrap();
        }

        let items = scan_all(&store, &table, 3).await.unwrap();
        assert_eq!(items.len(), 7);
        assert_eq!(store.scan_calls(), 3);
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect(&StoreConfig::memory()).await.unwrap();
        assert_eq!(store.backend(), "memory");
        store.ping().await.unwrap();
    }
}
