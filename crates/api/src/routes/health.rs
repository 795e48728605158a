//! Liveness and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Static text served at `/`.
pub const LIVENESS_MESSAGE: &str = "Mini Ecommerce Backend Running!";

/// Root liveness string.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store().backend(), "Store ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
