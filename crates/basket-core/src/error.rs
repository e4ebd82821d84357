//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CoreError        - NotFound, conflicts, storage failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  basket-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures, mapped into CoreError       │
//! │                                                                         │
//! │  basket-api errors (in app)                                            │
//! │  └── ApiError         - HTTP status + body the client sees             │
//! │                                                                         │
//! │  Flow: DbError → CoreError → ApiError → HTTP response                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pricing engine itself never fails. Every variant here comes from
//! resolving ids, validating input, or talking to a store.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the services and stores.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No basket with this id.
    #[error("Basket not found: {0}")]
    BasketNotFound(String),

    /// No product with this id or code.
    ///
    /// ## When This Occurs
    /// - Adding a product by id that was never created or has been deleted
    /// - Scanning a code that no product carries
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No discount with this id.
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// A different discount on the basket already targets this product code.
    ///
    /// ## Why This Is Rejected
    /// ```text
    /// Basket discounts: [10% off A0001]
    ///      │
    ///      ▼
    /// attach BOGO on A0001
    ///      │
    ///      ▼
    /// The engine would let the first discount claim every A0001 line and
    /// the second would match nothing, so the result depends on order.
    ///      │
    ///      ▼
    /// ConflictingDiscount { product_code: "A0001", existing: "<id>" }
    /// ```
    #[error("Basket already has discount {existing} for product code {product_code}")]
    ConflictingDiscount {
        product_code: String,
        existing: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Returns true for any of the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::BasketNotFound(_)
                | CoreError::ProductNotFound(_)
                | CoreError::DiscountNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements. They are
/// raised before anything reaches a store or the pricing engine.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (bad characters, unknown enum value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value exceeds the allowed maximum.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: String },

    /// Decimal value carries more fraction digits than allowed.
    #[error("{field} must have at most {max_scale} fraction digits")]
    TooPrecise { field: String, max_scale: u32 },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
