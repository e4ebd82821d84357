//! Basket handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use basket_core::{Basket, Money, PriceBreakdown};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::created;
use crate::state::AppState;

pub async fn list_baskets(State(state): State<AppState>) -> Result<Json<Vec<Basket>>, ApiError> {
    Ok(Json(state.baskets.get_baskets().await?))
}

pub async fn get_basket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Basket>, ApiError> {
    Ok(Json(state.baskets.get_basket(&id).await?))
}

/// Creates an empty basket.
pub async fn create_basket(State(state): State<AppState>) -> Result<Response, ApiError> {
    let basket = state.baskets.create_basket().await?;
    info!(id = %basket.id, "Basket created");
    Ok(created(format!("/api/baskets/{}", basket.id), basket))
}

pub async fn delete_basket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.baskets.delete_basket(&id).await?;
    info!(id = %id, "Basket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// The rounded total as a JSON decimal string, e.g. `"41.35"`.
pub async fn get_total(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Money>, ApiError> {
    let total = state.baskets.calculate_total(&id).await?;
    debug!(id = %id, total = %total, "Basket priced");
    Ok(Json(total))
}

pub async fn get_breakdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PriceBreakdown>, ApiError> {
    Ok(Json(state.baskets.price_breakdown(&id).await?))
}

pub async fn add_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.baskets.add_product(&id, &product_id).await?;
    debug!(basket = %id, product = %product_id, "Product added");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn scan_product(
    State(state): State<AppState>,
    Path((id, product_code)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.baskets.scan_product(&id, &product_code).await?;
    debug!(basket = %id, code = %product_code, "Product scanned");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.baskets.remove_product(&id, &product_id).await?;
    debug!(basket = %id, product = %product_id, "Product removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_discount(
    State(state): State<AppState>,
    Path((id, discount_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.baskets.add_discount(&id, &discount_id).await?;
    debug!(basket = %id, discount = %discount_id, "Discount attached");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_discount(
    State(state): State<AppState>,
    Path((id, discount_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.baskets.remove_discount(&id, &discount_id).await?;
    debug!(basket = %id, discount = %discount_id, "Discount detached");
    Ok(StatusCode::NO_CONTENT)
}
