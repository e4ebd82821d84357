//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in basket-api                             │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │       │                                                                 │
//! │       ├── CoreError::*NotFound        ──► 404, empty body              │
//! │       ├── CoreError::Validation       ──► 400 {code, message}          │
//! │       ├── CoreError::ConflictingDiscount ► 409 {code, message}         │
//! │       └── CoreError::Storage          ──► 500 {code, message}          │
//! │                                           (details only in the log)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use basket_core::CoreError;
use serde::Serialize;

/// Error returned from handlers.
///
/// ## Serialization
/// Every status except 404 carries a body:
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Basket already has discount d-1 for product code A0001"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Request conflicts with the basket's state (409)
    Conflict,

    /// Storage failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BasketNotFound(id) => ApiError::not_found("Basket", &id),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::DiscountNotFound(id) => ApiError::not_found("Discount", &id),
            err @ CoreError::ConflictingDiscount { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Storage(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Storage operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.code == ErrorCode::NotFound {
            tracing::debug!(message = %self.message, "Responding 404");
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use basket_core::ValidationError;

    #[tokio::test]
    async fn test_not_found_has_empty_body() {
        let response = ApiError::from(CoreError::BasketNotFound("b-1".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_validation_has_json_body() {
        let err: ApiError = CoreError::from(ValidationError::Required {
            field: "code".into(),
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "code is required");
    }

    #[test]
    fn test_status_mapping() {
        let conflict: ApiError = CoreError::ConflictingDiscount {
            product_code: "A0001".into(),
            existing: "d-1".into(),
        }
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let storage: ApiError = CoreError::Storage("disk full".into()).into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!storage.message.contains("disk full"));
    }
}
