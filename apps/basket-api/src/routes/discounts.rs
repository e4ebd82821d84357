//! Discount catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use basket_core::{Discount, DiscountInput};
use tracing::info;

use crate::error::ApiError;
use crate::routes::created;
use crate::state::AppState;

pub async fn list_discounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Discount>>, ApiError> {
    Ok(Json(state.discounts.get_discounts().await?))
}

pub async fn get_discount(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Discount>, ApiError> {
    Ok(Json(state.discounts.get_discount(&id).await?))
}

pub async fn create_discount(
    State(state): State<AppState>,
    Json(input): Json<DiscountInput>,
) -> Result<Response, ApiError> {
    let discount = state.discounts.create_discount(input).await?;
    info!(
        id = %discount.id,
        discount_type = %discount.discount_type,
        product_code = %discount.product_code,
        "Discount created"
    );
    Ok(created(format!("/api/discounts/{}", discount.id), discount))
}

pub async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DiscountInput>,
) -> Result<StatusCode, ApiError> {
    state.discounts.update_discount(&id, input).await?;
    info!(id = %id, "Discount updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.discounts.delete_discount(&id).await?;
    info!(id = %id, "Discount deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::response::IntoResponse;
    use basket_core::DiscountType;

    fn input(kind: DiscountType, code: &str) -> Json<DiscountInput> {
        Json(DiscountInput {
            discount_type: kind,
            product_code: code.to_string(),
        })
    }

    #[tokio::test]
    async fn test_discount_crud() {
        let state = test_state().await;

        let response = create_discount(
            State(state.clone()),
            input(DiscountType::TenPercentOff, "A0001"),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let Json(listed) = list_discounts(State(state.clone())).await.unwrap();
        assert_eq!(listed.len(), 1);
        let id = listed[0].id.clone();

        update_discount(
            State(state.clone()),
            Path(id.clone()),
            input(DiscountType::BuyOneGetOneFree, "A0002"),
        )
        .await
        .unwrap();
        let Json(discount) = get_discount(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(discount.discount_type, DiscountType::BuyOneGetOneFree);
        assert_eq!(discount.product_code, "A0002");

        delete_discount(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        let response = get_discount(State(state), Path(id)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_retarget_onto_claimed_code_is_409() {
        let state = test_state().await;
        let ten = state
            .discounts
            .create_discount(input(DiscountType::TenPercentOff, "A0001").0)
            .await
            .unwrap();
        let bogo = state
            .discounts
            .create_discount(input(DiscountType::BuyOneGetOneFree, "A0002").0)
            .await
            .unwrap();
        let basket = state.baskets.create_basket().await.unwrap();
        state.baskets.add_discount(&basket.id, &ten.id).await.unwrap();
        state.baskets.add_discount(&basket.id, &bogo.id).await.unwrap();

        let response = update_discount(
            State(state.clone()),
            Path(bogo.id.clone()),
            input(DiscountType::BuyOneGetOneFree, "A0001"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let Json(stored) = get_discount(State(state), Path(bogo.id)).await.unwrap();
        assert_eq!(stored.product_code, "A0002");
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let state = test_state().await;
        let body: DiscountInput =
            serde_json::from_str(r#"{"type":"HALF_PRICE","productCode":"A0001"}"#).unwrap();

        let response = create_discount(State(state), Json(body))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
