//! Wire-level tests: the API served on a local port and driven with `reqwest`.

use reqwest::StatusCode;
use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use serde_json::{Value, json};

use mini_shop_api::middleware::REQUEST_ID_HEADER;
use mini_shop_core::ORDER_CREATED_MESSAGE;
use mini_shop_integration_tests::{TestApi, spawn};

async fn base_url(api: &TestApi) -> String {
    let addr = spawn(api.router.clone()).await;
    format!("http://{addr}")
}

#[tokio::test]
async fn test_products_over_http() {
    let api = TestApi::new();
    api.seed_products(2).await;
    let base = base_url(&api).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/products"))
        .header(ORIGIN, "http://localhost:3000")
        .send()
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    assert!(request_id.is_some_and(|id| !id.is_empty()));

    let body: Value = response.json().await.unwrap_or_else(|e| panic!("{e}"));
    let ids: Vec<&str> = body
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, ["p001", "p002"]);
}

#[tokio::test]
async fn test_order_over_http_echoes_request_id() {
    let api = TestApi::new();
    let base = base_url(&api).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/order"))
        .header(REQUEST_ID_HEADER, "checkout-42")
        .json(&json!({
            "orderId": "o1700000000000",
            "productId": "p001",
            "timestamp": "2024-01-01T00:00:00Z",
        }))
        .send()
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("checkout-42")
    );
    let body: Value = response.json().await.unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(body["message"], ORDER_CREATED_MESSAGE);
    assert_eq!(api.store.items(&api.config.store.orders).await.len(), 1);
}

#[tokio::test]
async fn test_restricted_cors_over_http() {
    let api = TestApi::with_env(&[("CORS_ALLOWED_ORIGINS", "https://shop.example.com")]);
    let base = base_url(&api).await;
    let client = reqwest::Client::new();

    let allowed = client
        .get(format!("{base}/products"))
        .header(ORIGIN, "https://shop.example.com")
        .send()
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        allowed
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://shop.example.com")
    );

    let denied = client
        .get(format!("{base}/products"))
        .header(ORIGIN, "https://other.example.net")
        .send()
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
