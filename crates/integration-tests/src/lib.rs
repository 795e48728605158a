//! Integration test support for Mini Shop.
//!
//! The API runs in-process over the in-memory document store, so no
//! database or AWS account is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mini-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_products` - catalog listing and pagination
//! - `api_orders` - order validation and writes
//! - `api_http` - the API over a real socket with `reqwest`
//! - `storefront` - storefront client and rendered pages against a live API

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use mini_shop_api::config::ApiConfig;
use mini_shop_api::state::AppState;
use mini_shop_api::store::{DocumentStore, MemoryStore};
use mini_shop_core::Document;

/// An API router over a shared in-memory store.
pub struct TestApi {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: ApiConfig,
}

impl TestApi {
    /// API with default settings and an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// API configured from the given variables on top of
    /// `STORE_BACKEND=memory`.
    ///
    /// # Panics
    ///
    /// Panics if the variables do not form a valid configuration.
    #[must_use]
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([(
            "STORE_BACKEND".to_string(),
            "memory".to_string(),
        )]);
        env.extend(vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let config = ApiConfig::from_lookup(&|key| env.get(key).cloned())
            .unwrap_or_else(|e| panic!("invalid test configuration: {e}"));

        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let router = mini_shop_api::app(AppState::new(config.clone(), shared));

        Self {
            router,
            store,
            config,
        }
    }

    /// Write products `p001..=p{count}` directly to the store and return them.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects a write.
    pub async fn seed_products(&self, count: usize) -> Vec<Document> {
        let mut items = Vec::with_capacity(count);
        for n in 1..=count {
            let item = product_document(n);
            self.store
                .put(&self.config.store.products, item.clone())
                .await
                .unwrap_or_else(|e| panic!("seed failed: {e}"));
            items.push(item);
        }
        items
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to produce a response.
    pub async fn send(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));
        (status, headers, body.to_vec())
    }

    /// `GET` a path and return status and JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let request = Request::get(uri)
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("bad request: {e}"));
        let (status, headers, body) = self.send(request).await;
        (status, headers, parse_json(&body))
    }

    /// `POST` a raw JSON body and return status and JSON body.
    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|e| panic!("bad request: {e}"));
        let (status, _, body) = self.send(request).await;
        (status, parse_json(&body))
    }
}

impl Default for TestApi {
    fn default() -> Self {
        Self::new()
    }
}

/// A product document with a zero-padded id so key order equals seed order.
#[must_use]
pub fn product_document(n: usize) -> Document {
    let value = json!({
        "id": format!("p{n:03}"),
        "name": format!("Product {n}"),
        "price": 100 + n,
        "image": format!("https://cdn.example.com/p{n:03}.png"),
    });
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Serve a router on an ephemeral local port.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("failed to bind: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("no local address: {e}"));

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    addr
}

fn parse_json(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
