//! # Validation Module
//!
//! Input validation for catalog entries and discount sets.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API (axum extractors)                                        │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services                                                     │
//! │  └── THIS MODULE: code format, price sign/scale, discount conflicts    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(code) on products                                          │
//! │  └── Foreign keys on basket memberships                                │
//! │                                                                         │
//! │  The pricing engine never sees input that failed here.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Basket, Discount, DiscountInput, DiscountType, ProductInput};
use crate::{MAX_PRICE, MAX_PRICE_SCALE, MAX_PRODUCT_CODE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product code (also used for a discount's target code).
///
/// ## Rules
/// - Must not be blank
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use basket_core::validation::validate_product_code;
///
/// assert!(validate_product_code("A0001").is_ok());
/// assert!(validate_product_code("  ").is_err());
/// assert!(validate_product_code("A 0001").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_PRODUCT_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_PRODUCT_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a catalog price.
///
/// ## Rules
/// - Zero or greater
/// - At most [`MAX_PRICE`]
/// - At most [`MAX_PRICE_SCALE`] fraction digits
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    if price > MAX_PRICE {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: MAX_PRICE.to_string(),
        });
    }

    if price.amount().normalize().scale() > MAX_PRICE_SCALE {
        return Err(ValidationError::TooPrecise {
            field: "price".to_string(),
            max_scale: MAX_PRICE_SCALE,
        });
    }

    Ok(())
}

/// Rejects discount types this build cannot price.
pub fn validate_discount_type(discount_type: DiscountType) -> ValidationResult<()> {
    if discount_type == DiscountType::Unknown {
        return Err(ValidationError::InvalidFormat {
            field: "type".to_string(),
            reason: "must be one of TEN_PERCENT_OFF, BUY_1_GET_1_FREE".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a product create/update body.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_product_code(&input.code)?;
    validate_price(input.price)
}

/// Validates a discount create/update body.
pub fn validate_discount_input(input: &DiscountInput) -> ValidationResult<()> {
    validate_discount_type(input.discount_type)?;
    validate_product_code(&input.product_code).map_err(|err| match err {
        ValidationError::Required { .. } => ValidationError::Required {
            field: "productCode".to_string(),
        },
        other => other,
    })
}

// =============================================================================
// Discount Set Checks
// =============================================================================

/// Checks that `discount` can be attached to `basket` without a second
/// discount claiming the same product code.
///
/// Attaching a discount that is already on the basket is allowed (it is a
/// no-op for the set).
pub fn check_discount_attachable(basket: &Basket, discount: &Discount) -> CoreResult<()> {
    match basket.discount_for_code(&discount.product_code) {
        Some(existing) if existing.id != discount.id => Err(CoreError::ConflictingDiscount {
            product_code: discount.product_code.clone(),
            existing: existing.id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Reports every product code targeted by more than one discount, with the
/// ids of those discounts in processing order.
///
/// ## Example
/// ```rust
/// use basket_core::validation::find_conflicting_discounts;
/// use basket_core::{Discount, DiscountType};
///
/// let discounts = vec![
///     Discount::new(DiscountType::TenPercentOff, "A0001"),
///     Discount::new(DiscountType::BuyOneGetOneFree, "A0001"),
///     Discount::new(DiscountType::BuyOneGetOneFree, "A0002"),
/// ];
/// let conflicts = find_conflicting_discounts(&discounts);
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].0, "A0001");
/// ```
pub fn find_conflicting_discounts(discounts: &[Discount]) -> Vec<(String, Vec<String>)> {
    let mut by_code: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for discount in discounts {
        by_code
            .entry(discount.product_code.as_str())
            .or_default()
            .push(discount.id.clone());
    }

    by_code
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(code, ids)| (code.to_string(), ids))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
