//! # Domain Types
//!
//! Core domain types used throughout the basket service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Product      │   │     Discount     │   │     Basket      │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │   │  id (UUID)       │   │  id (UUID)      │      │
//! │  │  code (business)│◄──│  product_code    │   │  products: Vec  │      │
//! │  │  price (Money)  │   │  discount_type   │   │  discounts: Vec │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  ┌──────────────────┐                                                  │
//! │  │  DiscountType    │   The rule for each variant lives in the pricing │
//! │  │  TenPercentOff   │   engine, not here.                              │
//! │  │  BuyOneGetOneFree│                                                  │
//! │  │  Unknown         │                                                  │
//! │  └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Items, Not Quantities
//! A basket holding three `A0002` products has three separate entries in
//! `products`. There is no quantity column anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::money::Money;
use crate::pricing::{self, PriceBreakdown};

// =============================================================================
// Product
// =============================================================================

/// A product that can be placed in a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business key, unique across the catalog (e.g. `A0001`).
    pub code: String,

    /// Unit price.
    pub price: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id.
    pub fn new(code: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            price,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// The kind of discount. Serialized with the catalog's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountType {
    /// 10% off every matched line.
    #[serde(rename = "TEN_PERCENT_OFF")]
    TenPercentOff,

    /// Every second matched line is free (priced at the matched average).
    #[serde(rename = "BUY_1_GET_1_FREE")]
    BuyOneGetOneFree,

    /// A type this build does not know. Priced as no discount.
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl DiscountType {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::TenPercentOff => "TEN_PERCENT_OFF",
            DiscountType::BuyOneGetOneFree => "BUY_1_GET_1_FREE",
            DiscountType::Unknown => "UNKNOWN",
        }
    }

    /// Parses a wire name. Unrecognized names map to [`DiscountType::Unknown`]
    /// so rows written by newer versions still load.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "TEN_PERCENT_OFF" => DiscountType::TenPercentOff,
            "BUY_1_GET_1_FREE" => DiscountType::BuyOneGetOneFree,
            _ => DiscountType::Unknown,
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A discount rule targeting one product code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,

    #[serde(rename = "type")]
    pub discount_type: DiscountType,

    /// Code of the products this discount applies to.
    pub product_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    /// Creates a discount with a fresh id.
    pub fn new(discount_type: DiscountType, product_code: impl Into<String>) -> Self {
        let now = Utc::now();
        Discount {
            id: Uuid::new_v4().to_string(),
            discount_type,
            product_code: product_code.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Basket
// =============================================================================

/// A shopping basket: ordered line items plus a set of attached discounts.
///
/// ## Invariants
/// - `products` keeps insertion order; duplicates are separate lines
/// - `discounts` is unique by id and kept in attachment order, which is the
///   order the pricing engine processes them in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub id: String,
    pub products: Vec<Product>,
    pub discounts: Vec<Discount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Basket {
    /// Creates an empty basket with a fresh id.
    pub fn new() -> Self {
        let now = Utc::now();
        Basket {
            id: Uuid::new_v4().to_string(),
            products: Vec::new(),
            discounts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends one line item.
    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
        self.touch();
    }

    /// Removes the first line item with this product id.
    ///
    /// Returns `false` (and leaves the basket untouched) when no line matches.
    pub fn remove_product(&mut self, product_id: &str) -> bool {
        match self.products.iter().position(|p| p.id == product_id) {
            Some(index) => {
                self.products.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Attaches a discount. Attaching one that is already present is a no-op
    /// and returns `false`.
    pub fn add_discount(&mut self, discount: Discount) -> bool {
        if self.has_discount(&discount.id) {
            return false;
        }
        self.discounts.push(discount);
        self.touch();
        true
    }

    /// Detaches a discount by id. Returns `false` when it was not attached.
    pub fn remove_discount(&mut self, discount_id: &str) -> bool {
        let before = self.discounts.len();
        self.discounts.retain(|d| d.id != discount_id);
        let removed = self.discounts.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Checks whether a discount with this id is attached.
    pub fn has_discount(&self, discount_id: &str) -> bool {
        self.discounts.iter().any(|d| d.id == discount_id)
    }

    /// Finds the attached discount that targets `product_code`, if any.
    pub fn discount_for_code(&self, product_code: &str) -> Option<&Discount> {
        self.discounts.iter().find(|d| d.product_code == product_code)
    }

    /// Number of line items.
    pub fn item_count(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Computes the rounded total. Never stored.
    pub fn total(&self) -> Money {
        pricing::compute_total(&self.products, &self.discounts)
    }

    /// Computes the full per-discount breakdown.
    pub fn price_breakdown(&self) -> PriceBreakdown {
        pricing::price_basket(&self.products, &self.discounts)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Basket {
    fn default() -> Self {
        Basket::new()
    }
}

// =============================================================================
// Input DTOs
// =============================================================================

/// Fields a caller supplies to create or update a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub code: String,
    pub price: Money,
}

/// Fields a caller supplies to create or update a discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub product_code: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, cents: i64) -> Product {
        Product::new(code, Money::from_cents(cents))
    }

    #[test]
    fn test_discount_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DiscountType::BuyOneGetOneFree).unwrap(),
            "\"BUY_1_GET_1_FREE\""
        );
        let parsed: DiscountType = serde_json::from_str("\"TEN_PERCENT_OFF\"").unwrap();
        assert_eq!(parsed, DiscountType::TenPercentOff);

        let unknown: DiscountType = serde_json::from_str("\"HALF_PRICE_TUESDAY\"").unwrap();
        assert_eq!(unknown, DiscountType::Unknown);
    }

    #[test]
    fn test_discount_type_from_wire() {
        for kind in [DiscountType::TenPercentOff, DiscountType::BuyOneGetOneFree] {
            assert_eq!(DiscountType::from_wire(kind.as_str()), kind);
        }
        assert_eq!(DiscountType::from_wire("ten_percent_off"), DiscountType::Unknown);
    }

    #[test]
    fn test_discount_json_shape() {
        let discount = Discount::new(DiscountType::TenPercentOff, "A0001");
        let value = serde_json::to_value(&discount).unwrap();
        assert_eq!(value["type"], "TEN_PERCENT_OFF");
        assert_eq!(value["productCode"], "A0001");
    }

    #[test]
    fn test_basket_keeps_duplicate_lines_in_order() {
        let mut basket = Basket::new();
        let a = product("A0001", 1299);
        let b = product("A0002", 399);
        basket.add_product(a.clone());
        basket.add_product(b.clone());
        basket.add_product(a.clone());

        let codes: Vec<_> = basket.products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["A0001", "A0002", "A0001"]);
        assert_eq!(basket.item_count(), 3);
    }

    #[test]
    fn test_remove_product_removes_one_line() {
        let mut basket = Basket::new();
        let a = product("A0001", 1299);
        basket.add_product(a.clone());
        basket.add_product(a.clone());

        assert!(basket.remove_product(&a.id));
        assert_eq!(basket.item_count(), 1);
        assert!(basket.remove_product(&a.id));
        assert!(!basket.remove_product(&a.id));
        assert!(basket.is_empty());
    }

    #[test]
    fn test_discounts_are_a_set() {
        let mut basket = Basket::new();
        let discount = Discount::new(DiscountType::BuyOneGetOneFree, "A0002");

        assert!(basket.add_discount(discount.clone()));
        assert!(!basket.add_discount(discount.clone()));
        assert_eq!(basket.discounts.len(), 1);
        assert_eq!(basket.discount_for_code("A0002"), Some(&discount));

        assert!(basket.remove_discount(&discount.id));
        assert!(!basket.remove_discount(&discount.id));
        assert!(basket.discount_for_code("A0002").is_none());
    }

    #[test]
    fn test_empty_basket_total() {
        assert_eq!(Basket::new().total().to_string(), "0.00");
    }

    #[test]
    fn test_input_deserialization() {
        let input: ProductInput =
            serde_json::from_str(r#"{"code":"A0001","price":"12.99"}"#).unwrap();
        assert_eq!(input.price, Money::from_cents(1299));

        let input: DiscountInput =
            serde_json::from_str(r#"{"type":"BUY_1_GET_1_FREE","productCode":"A0002"}"#)
                .unwrap();
        assert_eq!(input.discount_type, DiscountType::BuyOneGetOneFree);
    }
}
