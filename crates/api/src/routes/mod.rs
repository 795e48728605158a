//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /               - Liveness string
//! GET  /health         - Health check
//! GET  /health/ready   - Readiness (store ping)
//!
//! GET  /products       - Product listing (?limit, ?cursor for a single page)
//! POST /order          - Create an order
//! ```

pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::liveness))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/products", get(products::index))
        .route("/order", post(orders::create))
}
