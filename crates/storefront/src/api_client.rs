//! HTTP client for the Mini Shop API.
//!
//! Uses `reqwest` with a per-request timeout. The product list is cached
//! in-process with `moka` so that page renders do not each trigger a full
//! table scan.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use mini_shop_core::{Order, OrderAck, Product, ProductId};

use crate::config::StorefrontConfig;

const PRODUCTS_CACHE_KEY: &str = "products";

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot address an endpoint.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// A failed catalog fetch reported to every caller that waited on it.
    #[error(transparent)]
    Shared(Arc<ApiError>),
}

impl ApiError {
    /// Text suitable for showing to a shopper.
    ///
    /// Client errors carry the API's own message; everything else is
    /// reduced to a generic notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if (400..500).contains(status) => message.clone(),
            Self::Shared(inner) => inner.user_message(),
            _ => "The shop is unavailable right now. Please try again later.".to_string(),
        }
    }
}

/// Error body returned by the API, `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the products and orders endpoints.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    products_url: Url,
    order_url: Url,
    products: Option<Cache<&'static str, Arc<Vec<Product>>>>,
}

impl ApiClient {
    /// Create a client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot be joined with the endpoint paths.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        Self::with_client(client, &config.api_url, config.product_cache_ttl)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined with the endpoint
    /// paths.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &Url,
        cache_ttl: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let products =
            cache_ttl.map(|ttl| Cache::builder().max_capacity(1).time_to_live(ttl).build());

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                products_url: base_url.join("products")?,
                order_url: base_url.join("order")?,
                products,
            }),
        })
    }

    /// Fetch the product catalog.
    ///
    /// Items that do not decode as a [`Product`] are skipped with a warning
    /// so that one bad record does not blank the whole page. Concurrent cache
    /// misses share a single request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the body is not a JSON array.
    #[instrument(skip(self))]
    pub async fn load_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        let Some(cache) = &self.inner.products else {
            return Ok(Arc::new(self.fetch_products().await?));
        };

        cache
            .try_get_with(PRODUCTS_CACHE_KEY, async {
                self.fetch_products().await.map(Arc::new)
            })
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(ApiError::Shared))
    }

    /// Place an order for a product, stamped with the current time.
    ///
    /// Returns the API's acknowledgement message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the order.
    pub async fn place_order(&self, product_id: ProductId) -> Result<String, ApiError> {
        let order = Order::place(product_id, Utc::now());
        self.submit_order(&order).await
    }

    /// Send a fully built order to the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the order.
    #[instrument(
        skip(self, order),
        fields(order_id = %order.order_id, product_id = %order.product_id)
    )]
    pub async fn submit_order(&self, order: &Order) -> Result<String, ApiError> {
        let response = self
            .inner
            .client
            .post(self.inner.order_url.clone())
            .json(order)
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        let ack: OrderAck = serde_json::from_str(&body)?;

        debug!(message = %ack.message, "Order acknowledged");
        Ok(ack.message)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.inner.products_url.clone())
            .send()
            .await?;

        let body = Self::success_body(response).await?;
        let items: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        let total = items.len();

        let products: Vec<Product> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Product>(item.clone()) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(
                        error = %e,
                        id = %item.get("id").map(ToString::to_string).unwrap_or_default(),
                        "Skipping product that does not decode"
                    );
                    None
                }
            })
            .collect();

        debug!(total, decoded = products.len(), "Fetched products");
        Ok(products)
    }

    /// Read the response body, turning non-success statuses into
    /// [`ApiError::Api`].
    async fn success_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
