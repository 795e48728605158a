//! Orders placed from the storefront.
//!
//! The wire shape is `{ orderId, productId, timestamp }`. Requests arrive as
//! an [`OrderRequest`] with every field optional so that missing fields can be
//! reported by name, then convert into a validated [`Order`].

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::document::Document;
use super::id::{IdError, OrderId, ProductId};

/// Message returned when an order has been written.
pub const ORDER_CREATED_MESSAGE: &str = "Order Created!";

/// Acknowledgement body returned by `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    pub message: String,
}

impl OrderAck {
    /// The acknowledgement for a successfully written order.
    #[must_use]
    pub fn created() -> Self {
        Self {
            message: ORDER_CREATED_MESSAGE.to_string(),
        }
    }
}

/// Validation errors for an incoming order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} is invalid: {source}")]
    InvalidId {
        field: &'static str,
        source: IdError,
    },
    #[error("timestamp is not a valid ISO-8601 date-time: {0}")]
    InvalidTimestamp(String),
}

/// Unvalidated order body as received over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub timestamp: Option<String>,
}

/// A validated order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// Create an order for a product at the given instant.
    ///
    /// The order ID derives from the instant (see [`OrderId::from_timestamp`])
    /// and the timestamp keeps millisecond precision.
    #[must_use]
    pub fn place(product_id: ProductId, at: DateTime<Utc>) -> Self {
        Self {
            order_id: OrderId::from_timestamp(at),
            product_id,
            timestamp: at.trunc_subsecs(3),
        }
    }

    /// Convert into a store document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Ok(Document::new()),
        }
    }
}

impl TryFrom<OrderRequest> for Order {
    type Error = OrderError;

    fn try_from(request: OrderRequest) -> Result<Self, Self::Error> {
        let order_id = request
            .order_id
            .ok_or(OrderError::MissingField("orderId"))?;
        let order_id = OrderId::parse(&order_id).map_err(|source| OrderError::InvalidId {
            field: "orderId",
            source,
        })?;

        let product_id = request
            .product_id
            .ok_or(OrderError::MissingField("productId"))?;
        let product_id =
            ProductId::parse(&product_id).map_err(|source| OrderError::InvalidId {
                field: "productId",
                source,
            })?;

        let timestamp = request
            .timestamp
            .ok_or(OrderError::MissingField("timestamp"))?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| OrderError::InvalidTimestamp(e.to_string()))?
            .with_timezone(&Utc);

        Ok(Self {
            order_id,
            product_id,
            timestamp,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn request(value: serde_json::Value) -> OrderRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_well_formed_request() {
        let order = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "p1",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .unwrap();

        assert_eq!(order.order_id.as_str(), "o1");
        assert_eq!(order.product_id.as_str(), "p1");
        assert_eq!(
            order.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_document_preserves_fields() {
        let order = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "p1",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .unwrap();

        let doc = order.to_document().unwrap();
        assert_eq!(
            serde_json::Value::Object(doc),
            json!({
                "orderId": "o1",
                "productId": "p1",
                "timestamp": "2024-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_empty_body_reports_first_missing_field() {
        let err = Order::try_from(request(json!({}))).unwrap_err();
        assert_eq!(err, OrderError::MissingField("orderId"));
        assert_eq!(err.to_string(), "orderId is required");
    }

    #[test]
    fn test_blank_product_id() {
        let err = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "",
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidId {
                field: "productId",
                source: IdError::Empty
            }
        );
    }

    #[test]
    fn test_bad_timestamp() {
        let err = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "p1",
            "timestamp": "yesterday"
        })))
        .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_offset_timestamp_normalised_to_utc() {
        let order = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "p1",
            "timestamp": "2024-01-01T05:30:00+05:30"
        })))
        .unwrap();
        let doc = order.to_document().unwrap();
        assert_eq!(doc.get("timestamp"), Some(&json!("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_place_truncates_to_milliseconds() {
        let at = Utc.timestamp_nanos(1_704_067_200_123_456_789);
        let order = Order::place(ProductId::parse("p1").unwrap(), at);
        assert_eq!(order.order_id.as_str(), "o1704067200123");
        assert_eq!(order.timestamp.timestamp_subsec_millis(), 123);
        assert_eq!(order.timestamp.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let order = Order::try_from(request(json!({
            "orderId": "o1",
            "productId": "p1",
            "timestamp": "2024-01-01T00:00:00Z",
            "quantity": 3
        })))
        .unwrap();
        let doc = order.to_document().unwrap();
        assert!(!doc.contains_key("quantity"));
    }
}
