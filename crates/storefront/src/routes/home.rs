//! Product grid and order placement.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use mini_shop_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product view for templates.
#[derive(Clone, Debug)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Formatted price, e.g. "₹499.00".
    pub price: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price().display(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub products: Vec<ProductCard>,
    /// Acknowledgement shown in the order dialog.
    pub message: Option<String>,
    /// Failure notice; set whenever the API could not be reached.
    pub error: Option<String>,
}

/// "Buy Now" form body.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    pub product_id: String,
}

/// Display the product grid.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Response {
    render(&state, None, None).await
}

/// Place an order and show the API's message over the product grid.
#[instrument(skip(state, form))]
pub async fn order(
    State(state): State<AppState>,
    form: std::result::Result<Form<OrderForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let product_id = ProductId::parse(&form.product_id)
        .map_err(|e| AppError::BadRequest(format!("product_id {e}")))?;

    match state.api().place_order(product_id).await {
        Ok(message) => Ok(render(&state, Some(message), None).await),
        Err(e) => {
            tracing::error!(error = %e, product_id = %form.product_id, "Order failed");
            Ok(render(&state, None, Some(e.user_message())).await)
        }
    }
}

/// Render the grid, answering `502 Bad Gateway` when any API call failed.
async fn render(state: &AppState, message: Option<String>, error: Option<String>) -> Response {
    let (products, load_error) = match state.api().load_products().await {
        Ok(products) => (products.iter().map(ProductCard::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let error = error.or(load_error);
    let status = if error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    (
        status,
        IndexTemplate {
            products,
            message,
            error,
        },
    )
        .into_response()
}
