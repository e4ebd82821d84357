//! # Application State
//!
//! Shared across handlers through axum's `State` extractor. Cloning is cheap:
//! the services hold `Arc`s and the database holds a pool handle.

use std::sync::Arc;

use basket_core::{BasketService, DiscountService, ProductService};
use basket_db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub baskets: BasketService,
    pub products: ProductService,
    pub discounts: DiscountService,
}

impl AppState {
    /// Wires the services to the SQLite repositories of `db`.
    pub fn new(db: Database) -> Self {
        let products = Arc::new(db.products());
        let discounts = Arc::new(db.discounts());
        let baskets = Arc::new(db.baskets());

        AppState {
            baskets: BasketService::new(baskets.clone(), products.clone(), discounts.clone()),
            products: ProductService::new(products),
            discounts: DiscountService::new(discounts, baskets),
            db,
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    use basket_db::DbConfig;

    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::new(db)
}
