//! In-memory document store.
//!
//! Items are kept per table in key order, so scans page exactly like the
//! `PostgreSQL` backend. Failures can be injected per operation for tests.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use mini_shop_core::Document;

use super::{Cursor, DocumentStore, Result, ScanPage, ScanRequest, StoreError, Table};

/// In-memory implementation of `DocumentStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    fail_scan: AtomicBool,
    fail_get: AtomicBool,
    fail_put: AtomicBool,
    scan_calls: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent scan fail.
    pub fn set_fail_scan(&self, fail: bool) {
        self.fail_scan.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent get fail.
    pub fn set_fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent put fail.
    pub fn set_fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    /// Number of scan calls served so far.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// All items of a table in key order.
    pub async fn items(&self, table: &Table) -> Vec<Document> {
        self.tables
            .read()
            .await
            .get(&table.name)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "injected {operation} failure"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn scan(&self, table: &Table, request: ScanRequest) -> Result<ScanPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_scan, "scan")?;

        let after = request
            .cursor
            .as_ref()
            .map(|cursor| cursor.start_key(table))
            .transpose()?;

        let tables = self.tables.read().await;
        let Some(items) = tables.get(&table.name) else {
            return Ok(ScanPage::default());
        };

        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);
        let limit = request.limit as usize;
        let mut range = items.range((lower, Bound::Unbounded));

        let page: Vec<(&String, &Document)> = range.by_ref().take(limit).collect();
        let has_more = range.next().is_some();

        let next = match page.last() {
            Some((last_key, _)) if has_more => Some(Cursor::after_key(table, last_key)?),
            _ => None,
        };

        Ok(ScanPage {
            items: page.into_iter().map(|(_, doc)| doc.clone()).collect(),
            next,
        })
    }

    async fn get(&self, table: &Table, key: &str) -> Result<Option<Document>> {
        Self::check(&self.fail_get, "get")?;
        Ok(self
            .tables
            .read()
            .await
            .get(&table.name)
            .and_then(|items| items.get(key))
            .cloned())
    }

    async fn put(&self, table: &Table, item: Document) -> Result<()> {
        Self::check(&self.fail_put, "put")?;
        let key = table.key_of(&item)?.to_string();
        self.tables
            .write()
            .await
            .entry(table.name.clone())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn products() -> Table {
        Table::new("Products", "id")
    }

    fn product(id: &str) -> Document {
        json!({"id": id, "name": format!("Product {id}"), "price": 10})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_scan_pages_in_key_order() {
        let store = MemoryStore::new();
        for id in ["p3", "p1", "p2"] {
            store.put(&products(), product(id)).await.unwrap();
        }

        let first = store
            .scan(
                &products(),
                ScanRequest {
                    limit: 2,
                    cursor: None,
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = first.items.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("p1"), json!("p2")]);
        assert!(first.next.is_some());

        let second = store
            .scan(
                &products(),
                ScanRequest {
                    limit: 2,
                    cursor: first.next,
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0]["id"], json!("p3"));
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_has_no_cursor() {
        let store = MemoryStore::new();
        store.put(&products(), product("p1")).await.unwrap();

        let page = store
            .scan(
                &products(),
                ScanRequest {
                    limit: 1,
                    cursor: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemoryStore::new();
        let orders = Table::new("Orders", "orderId");
        let first = json!({"orderId": "o1", "productId": "p1"});
        let second = json!({"orderId": "o1", "productId": "p2"});

        store
            .put(&orders, first.as_object().cloned().unwrap())
            .await
            .unwrap();
        store
            .put(&orders, second.as_object().cloned().unwrap())
            .await
            .unwrap();

        let items = store.items(&orders).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["productId"], json!("p2"));
    }

    #[tokio::test]
    async fn test_put_requires_key() {
        let store = MemoryStore::new();
        let err = store
            .put(&products(), json!({"name": "x"}).as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingKey(_)));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        store.set_fail_put(true);
        assert!(store.put(&products(), product("p1")).await.is_err());

        store.set_fail_scan(true);
        let err = store
            .scan(
                &products(),
                ScanRequest {
                    limit: 10,
                    cursor: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_fail_get(true);
        assert!(store.get(&products(), "p1").await.is_err());
    }

    #[tokio::test]
    async fn test_cursor_for_other_key_is_invalid() {
        let store = MemoryStore::new();
        store.put(&products(), product("p1")).await.unwrap();

        let mut foreign = Document::new();
        foreign.insert("orderId".to_string(), json!("o1"));
        let err = store
            .scan(
                &products(),
                ScanRequest {
                    limit: 10,
                    cursor: Some(Cursor::encode(&foreign).unwrap()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor));
    }
}
