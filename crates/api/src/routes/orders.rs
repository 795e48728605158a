//! Order creation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, instrument};

use mini_shop_core::{Order, OrderAck, OrderRequest};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Validate and store an order.
///
/// The write is unconditional: an existing order with the same `orderId` is
/// replaced. When `ORDER_REQUIRE_KNOWN_PRODUCT` is set the product must exist
/// in the Products table.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderAck>> {
    let Json(request) = body?;
    let order = Order::try_from(request)?;

    if state.config().require_known_product
        && state
            .store()
            .get(state.products_table(), order.product_id.as_str())
            .await?
            .is_none()
    {
        return Err(AppError::UnknownProduct(order.product_id.into_inner()));
    }

    let item = order
        .to_document()
        .map_err(|e| AppError::Internal(format!("failed to encode order: {e}")))?;
    state.store().put(state.orders_table(), item).await?;

    info!(
        order_id = %order.order_id,
        product_id = %order.product_id,
        "Order created"
    );

    Ok(Json(OrderAck::created()))
}
