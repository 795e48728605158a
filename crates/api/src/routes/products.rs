//! Product listing.
//!
//! Without query parameters the whole Products table is returned, following
//! scan cursors until the table is exhausted. With `?limit` or `?cursor` a
//! single page is returned and `x-next-cursor` carries the continuation
//! token when more items remain.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::config::MAX_PAGE_SIZE;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::{Cursor, ScanRequest, scan_all};

/// Response header holding the cursor of the next page.
pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// List products.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ScanQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let table = state.products_table();

    if query.limit.is_none() && query.cursor.is_none() {
        let items = scan_all(state.store(), table, state.config().store.page_size).await?;
        tracing::debug!(count = items.len(), "Listed products");
        return Ok(Json(items).into_response());
    }

    let limit = query
        .limit
        .unwrap_or(state.config().store.page_size)
        .clamp(1, MAX_PAGE_SIZE);
    let page = state
        .store()
        .scan(
            table,
            ScanRequest {
                limit,
                cursor: query.cursor.map(Cursor::from_token),
            },
        )
        .await?;

    let mut headers = HeaderMap::new();
    if let Some(next) = page.next {
        let value = HeaderValue::from_str(next.as_str())
            .map_err(|e| AppError::Internal(format!("unencodable cursor: {e}")))?;
        headers.insert(NEXT_CURSOR_HEADER, value);
    }

    Ok((headers, Json(page.items)).into_response())
}
