//! # Pricing Engine
//!
//! Turns a basket's line items and attached discounts into a total.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Basket Total Calculation                           │
//! │                                                                         │
//! │  remaining = all line items          total = 0                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each discount (attachment order):                                  │
//! │       ├── matched  = remaining where code == discount.product_code      │
//! │       ├── subtotal = Σ matched prices                                   │
//! │       ├── value    = rule(discount.type, subtotal, |matched|)           │
//! │       ├── total   += subtotal - value                                   │
//! │       └── remaining -= matched        (consumed, cannot match again)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total += Σ remaining prices          (undiscounted lines)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  round half-up to 2 digits ──► result                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rule Table
//! | Type               | Discount value                          |
//! |--------------------|-----------------------------------------|
//! | `TenPercentOff`    | `subtotal × 0.10`                       |
//! | `BuyOneGetOneFree` | `(subtotal / n) × ⌊n / 2⌋`              |
//! | `Unknown`          | `0`                                     |
//!
//! The buy-one-get-one rule prices free items at the *average* matched price,
//! not the cheapest one. Totals produced by earlier systems depend on this.
//!
//! ## Example
//! ```rust
//! use basket_core::{pricing, Discount, DiscountType, Money, Product};
//!
//! let item = Product::new("A0002", Money::from_cents(399));
//! let items = vec![item.clone(), item.clone(), item];
//! let bogo = vec![Discount::new(DiscountType::BuyOneGetOneFree, "A0002")];
//!
//! assert_eq!(pricing::compute_total(&items, &bogo).to_string(), "7.98");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Discount, DiscountType, Product};

/// Rate of the ten-percent-off rule.
const TEN_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

// =============================================================================
// Breakdown Types
// =============================================================================

/// What one discount did during a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountLine {
    pub discount_id: String,
    pub product_code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    /// Line items this discount claimed from the remaining pool.
    pub matched: usize,
    /// Sum of the matched prices.
    pub subtotal: Money,
    /// Amount taken off `subtotal`, unrounded.
    pub discount: Money,
    /// `subtotal - discount`.
    pub net: Money,
}

/// Full result of pricing a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// One entry per discount, in processing order.
    pub lines: Vec<DiscountLine>,
    /// Number of line items no discount claimed.
    pub undiscounted_items: usize,
    /// Sum of the prices no discount claimed.
    pub undiscounted: Money,
    /// Sum of every net and the undiscounted remainder, before rounding.
    pub unrounded: Money,
    /// `unrounded` rounded half-up to currency precision.
    pub total: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the rounded total of `line_items` with `discounts` applied.
///
/// Pure and total: an empty basket gives `0.00`, and no input makes it fail.
pub fn compute_total(line_items: &[Product], discounts: &[Discount]) -> Money {
    price_basket(line_items, discounts).total
}

/// Prices a basket and reports what each discount contributed.
///
/// Discounts are processed in slice order. Each one consumes the lines it
/// matches, so a later discount on the same code finds nothing left.
pub fn price_basket(line_items: &[Product], discounts: &[Discount]) -> PriceBreakdown {
    let mut remaining: Vec<&Product> = line_items.iter().collect();
    let mut lines = Vec::with_capacity(discounts.len());
    let mut running = Money::zero();

    for discount in discounts {
        let (matched, rest): (Vec<&Product>, Vec<&Product>) = remaining
            .into_iter()
            .partition(|product| product.code == discount.product_code);
        remaining = rest;

        let subtotal: Money = matched.iter().map(|product| product.price).sum();
        let value = discount_value(discount.discount_type, subtotal, matched.len());
        let net = subtotal - value;
        running = running.saturating_add(net);

        lines.push(DiscountLine {
            discount_id: discount.id.clone(),
            product_code: discount.product_code.clone(),
            discount_type: discount.discount_type,
            matched: matched.len(),
            subtotal,
            discount: value,
            net,
        });
    }

    let undiscounted: Money = remaining.iter().map(|product| product.price).sum();
    running = running.saturating_add(undiscounted);

    PriceBreakdown {
        lines,
        undiscounted_items: remaining.len(),
        undiscounted,
        unrounded: running,
        total: running.to_currency(),
    }
}

/// The rule table. `matched` is the number of lines behind `subtotal`.
fn discount_value(discount_type: DiscountType, subtotal: Money, matched: usize) -> Money {
    // Nothing matched: nothing to discount, and no division by zero below.
    if matched == 0 {
        return Money::zero();
    }

    match discount_type {
        DiscountType::TenPercentOff => subtotal * TEN_PERCENT,
        DiscountType::BuyOneGetOneFree => {
            let free_items = matched / 2;
            subtotal
                .split_evenly(matched)
                .map(|per_item| per_item * free_items)
                .unwrap_or_default()
        }
        DiscountType::Unknown => Money::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
