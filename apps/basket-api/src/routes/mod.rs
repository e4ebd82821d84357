//! # Routes
//!
//! ```text
//! /api/baskets                                   GET list, POST create
//! /api/baskets/{id}                              GET, DELETE
//! /api/baskets/{id}/total                        GET
//! /api/baskets/{id}/breakdown                    GET
//! /api/baskets/{id}/products/{productId}         PATCH add, DELETE remove
//! /api/baskets/{id}/scan/{productCode}           PATCH add by code
//! /api/baskets/{id}/discounts/{discountId}       PATCH attach, DELETE detach
//! /api/products, /api/products/{id}              CRUD
//! /api/discounts, /api/discounts/{id}            CRUD
//! /health                                        database health
//! ```
//!
//! Mutations answer `204 No Content`; creations answer `201 Created` with a
//! `Location` header and the created resource.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub mod baskets;
pub mod discounts;
pub mod health;
pub mod products;

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/baskets",
            get(baskets::list_baskets).post(baskets::create_basket),
        )
        .route(
            "/api/baskets/{id}",
            get(baskets::get_basket).delete(baskets::delete_basket),
        )
        .route("/api/baskets/{id}/total", get(baskets::get_total))
        .route("/api/baskets/{id}/breakdown", get(baskets::get_breakdown))
        .route(
            "/api/baskets/{id}/products/{product_id}",
            patch(baskets::add_product).delete(baskets::remove_product),
        )
        .route(
            "/api/baskets/{id}/scan/{product_code}",
            patch(baskets::scan_product),
        )
        .route(
            "/api/baskets/{id}/discounts/{discount_id}",
            patch(baskets::add_discount).delete(baskets::remove_discount),
        )
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/discounts",
            get(discounts::list_discounts).post(discounts::create_discount),
        )
        .route(
            "/api/discounts/{id}",
            get(discounts::get_discount)
                .put(discounts::update_discount)
                .delete(discounts::delete_discount),
        )
        .route("/health", get(health::health))
        .with_state(state)
}

/// `201 Created` with a `Location` header and the resource as JSON.
pub(crate) fn created<T: Serialize>(location: String, body: T) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response()
}
