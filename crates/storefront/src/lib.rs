//! Mini Shop Storefront library.
//!
//! This crate provides the storefront as a library, allowing it to be
//! tested and reused.
//!
//! # Architecture
//!
//! - Axum web framework with plain HTML forms (no JavaScript)
//! - Askama templates for server-side rendering with autoescaping
//! - [`api_client::ApiClient`] for the products and orders endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api_client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
