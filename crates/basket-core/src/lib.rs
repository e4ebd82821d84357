//! # basket-core: Pricing Engine and Domain for Basket Pricing
//!
//! This crate is the **heart** of the basket service. It owns the money type,
//! the domain entities and the pricing engine, plus the store traits and the
//! services that drive baskets through them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Basket Pricing Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 basket-api (axum REST routes)                   │   │
//! │  │    /api/baskets ──► /api/products ──► /api/discounts            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   store   │  │  service  │  │   │
//! │  │   │  Product  │  │  engine   │  │  traits   │  │  Basket   │  │   │
//! │  │   │  Discount │  │ breakdown │  │ in-memory │  │  Product  │  │   │
//! │  │   │  Basket   │  │           │  │           │  │  Discount │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • PURE PRICING                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ implements store traits               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  basket-db (SQLite repositories)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money` with half-up currency rounding
//! - [`types`] - Product, Discount, Basket and input DTOs
//! - [`pricing`] - The pricing engine (`compute_total`, `price_basket`)
//! - [`validation`] - Input and discount-set checks
//! - [`store`] - Store traits and the in-memory store
//! - [`service`] - Basket, product and discount services
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use basket_core::{pricing, Discount, DiscountType, Money, Product};
//!
//! let shirt = Product::new("A0001", "12.99".parse::<Money>().unwrap());
//! let items = vec![shirt.clone(), shirt];
//! let discounts = vec![Discount::new(DiscountType::TenPercentOff, "A0001")];
//!
//! // 25.98 - 2.598 = 23.382 → 23.38
//! let total = pricing::compute_total(&items, &discounts);
//! assert_eq!(total.to_string(), "23.38");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_total, price_basket, DiscountLine, PriceBreakdown};
pub use service::{BasketService, DiscountService, ProductService};
pub use store::{
    BasketStore, DiscountCatalog, DiscountLookup, InMemoryStore, ProductCatalog, ProductLookup,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fraction digits of the currency the totals are rounded to.
pub const CURRENCY_SCALE: u32 = 2;

/// Maximum fraction digits accepted on a catalog price.
///
/// Prices are normally two-digit; a little headroom lets unit prices such as
/// `0.125` through while still rejecting obviously malformed input.
pub const MAX_PRICE_SCALE: u32 = 4;

/// Largest catalog price accepted (one billion).
pub const MAX_PRICE: Money =
    Money::new(rust_decimal::Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

/// Maximum length of a product code.
pub const MAX_PRODUCT_CODE_LEN: usize = 50;
