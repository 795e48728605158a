//! Mini Shop API library.
//!
//! This crate provides the API service as a library, allowing it to be
//! tested in-process and reused by the CLI.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Document store behind the [`store::DocumentStore`] trait
//!   (DynamoDB, `PostgreSQL` or in-memory)
//! - Store handle constructed once and injected through [`state::AppState`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;

use crate::state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can run without them.
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config().cors_allowed_origins);

    routes::routes()
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::trace_layer())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ApiConfig, StoreConfig};
    use crate::store::MemoryStore;

    fn test_app() -> Router {
        let mut config = ApiConfig::from_lookup(&|_| None).unwrap();
        config.store = StoreConfig::memory();
        app(AppState::new(config, Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], routes::health::LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let response = test_app()
            .oneshot(
                Request::get("/products")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    fn restricted_app() -> Router {
        let mut config = ApiConfig::from_lookup(&|_| None).unwrap();
        config.store = StoreConfig::memory();
        config.cors_allowed_origins = vec!["https://shop.example.com".to_string()];
        app(AppState::new(config, Arc::new(MemoryStore::new())))
    }

    async fn allow_origin_for(router: Router, origin: &str) -> Option<String> {
        let response = router
            .oneshot(
                Request::get("/products")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    #[tokio::test]
    async fn test_cors_echoes_listed_origin() {
        let allowed = allow_origin_for(restricted_app(), "https://shop.example.com").await;
        assert_eq!(allowed.as_deref(), Some("https://shop.example.com"));
    }

    #[tokio::test]
    async fn test_cors_omits_header_for_unlisted_origin() {
        let allowed = allow_origin_for(restricted_app(), "https://evil.example.net").await;
        assert_eq!(allowed, None);
    }
}
