//! # Repository Module
//!
//! SQLite implementations of the basket-core store traits.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BasketService / ProductService / DiscountService                      │
//! │       │                                                                 │
//! │       │  Arc<dyn BasketStore>, Arc<dyn ProductCatalog>, ...            │
//! │       ▼                                                                 │
//! │  BasketRepository    baskets + basket_items + basket_discounts         │
//! │  ProductRepository   products                                          │
//! │  DiscountRepository  discounts                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository has inherent methods returning [`DbResult`](crate::error::DbResult)
//! and a trait impl that converts into `CoreResult` at the boundary.

pub mod basket;
pub mod discount;
pub mod product;
