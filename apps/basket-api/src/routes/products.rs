//! Product catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use basket_core::{Product, ProductInput};
use tracing::info;

use crate::error::ApiError;
use crate::routes::created;
use crate::state::AppState;

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.get_products().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get_product(&id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<Response, ApiError> {
    let product = state.products.create_product(input).await?;
    info!(id = %product.id, code = %product.code, price = %product.price, "Product created");
    Ok(created(format!("/api/products/{}", product.id), product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<StatusCode, ApiError> {
    let product = state.products.update_product(&id, input).await?;
    info!(id = %product.id, code = %product.code, price = %product.price, "Product updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.products.delete_product(&id).await?;
    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::body::to_bytes;
    use axum::http::header;
    use axum::response::IntoResponse;

    fn input(code: &str, price: &str) -> Json<ProductInput> {
        Json(ProductInput {
            code: code.to_string(),
            price: price.parse().unwrap(),
        })
    }

    #[tokio::test]
    async fn test_product_crud() {
        let state = test_state().await;

        let response = create_product(State(state.clone()), input("A0001", "12.99"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        let id = location.trim_start_matches("/api/products/").to_string();

        let Json(product) = get_product(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(product.code, "A0001");

        let status = update_product(State(state.clone()), Path(id.clone()), input("A0001", "11.99"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let Json(listed) = list_products(State(state.clone())).await.unwrap();
        assert_eq!(listed[0].price.to_string(), "11.99");

        delete_product(State(state.clone()), Path(id.clone())).await.unwrap();
        let response = get_product(State(state), Path(id)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_and_duplicate_input_is_400() {
        let state = test_state().await;
        create_product(State(state.clone()), input("A0001", "12.99"))
            .await
            .unwrap();

        let response = create_product(State(state.clone()), input("A0001", "1.00"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = create_product(State(state.clone()), input("A0002", "-3.99"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let state = test_state().await;
        let response = update_product(State(state), Path("missing".into()), input("A0001", "1.00"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
