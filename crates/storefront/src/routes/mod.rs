//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                - Product grid
//! POST /order           - Place an order (form: product_id)
//! GET  /static/main.css - Stylesheet
//! GET  /health          - Health check
//! ```

pub mod assets;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/order", post(home::order))
        .route("/static/main.css", get(assets::main_css))
        .route("/health", get(health))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the API.
async fn health() -> &'static str {
    "ok"
}
