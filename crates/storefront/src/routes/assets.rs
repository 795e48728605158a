//! Embedded static assets.

use axum::{http::header, response::IntoResponse};

const MAIN_CSS: &str = include_str!("../../static/main.css");

/// Serve the stylesheet.
pub async fn main_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        MAIN_CSS,
    )
}
