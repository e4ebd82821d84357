//! # Store Traits
//!
//! The collaborators the services talk to, plus an in-memory implementation.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BasketService                                                          │
//! │   ├── Arc<dyn BasketStore>     list_all / get / create / delete / save  │
//! │   ├── Arc<dyn ProductLookup>   by_id / by_code                          │
//! │   └── Arc<dyn DiscountLookup>  by_id                                    │
//! │                                                                         │
//! │  ProductService  ── Arc<dyn ProductCatalog>   (lookup + CRUD)           │
//! │  DiscountService ── Arc<dyn DiscountCatalog>  (lookup + CRUD)           │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │   • InMemoryStore (this file)   tests, demos                            │
//! │   • basket-db repositories      SQLite                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups return `Ok(None)` for a missing entity; the services decide which
//! `NotFound` error that becomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Basket, Discount, Product};

// =============================================================================
// Traits
// =============================================================================

/// Persistence for baskets and their memberships.
#[async_trait]
pub trait BasketStore: Send + Sync {
    /// All baskets, oldest first.
    async fn list_all(&self) -> CoreResult<Vec<Basket>>;

    async fn get(&self, id: &str) -> CoreResult<Option<Basket>>;

    /// Stores a new basket and returns it as stored.
    async fn create(&self, basket: Basket) -> CoreResult<Basket>;

    /// Deletes a basket. Returns whether it existed.
    async fn delete(&self, id: &str) -> CoreResult<bool>;

    /// Writes the basket's line items and discounts, replacing what was stored.
    async fn save(&self, basket: &Basket) -> CoreResult<()>;
}

/// Read access to products.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Product>>;

    async fn by_code(&self, code: &str) -> CoreResult<Option<Product>>;
}

/// Full product management.
#[async_trait]
pub trait ProductCatalog: ProductLookup {
    async fn list(&self) -> CoreResult<Vec<Product>>;

    /// Inserts a product. A taken code is a `Duplicate` validation error.
    async fn create(&self, product: Product) -> CoreResult<Product>;

    /// Overwrites code and price of an existing product.
    async fn update(&self, product: &Product) -> CoreResult<()>;

    /// Returns whether the product existed.
    async fn delete(&self, id: &str) -> CoreResult<bool>;
}

/// Read access to discounts.
#[async_trait]
pub trait DiscountLookup: Send + Sync {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Discount>>;
}

/// Full discount management.
#[async_trait]
pub trait DiscountCatalog: DiscountLookup {
    async fn list(&self) -> CoreResult<Vec<Discount>>;

    async fn create(&self, discount: Discount) -> CoreResult<Discount>;

    /// Overwrites type and target code of an existing discount.
    async fn update(&self, discount: &Discount) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<bool>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Stored shape of a basket: memberships by id, resolved on read.
#[derive(Debug, Clone)]
struct BasketRecord {
    id: String,
    product_ids: Vec<String>,
    discount_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Basket> for BasketRecord {
    fn from(basket: &Basket) -> Self {
        BasketRecord {
            id: basket.id.clone(),
            product_ids: basket.products.iter().map(|p| p.id.clone()).collect(),
            discount_ids: basket.discounts.iter().map(|d| d.id.clone()).collect(),
            created_at: basket.created_at,
            updated_at: basket.updated_at,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    baskets: HashMap<String, BasketRecord>,
    products: HashMap<String, Product>,
    discounts: HashMap<String, Discount>,
}

impl Tables {
    /// Builds a basket from its record against the current catalog.
    ///
    /// Memberships whose product or discount has since been deleted are
    /// dropped, and prices are the catalog's current ones.
    fn resolve(&self, record: &BasketRecord) -> Basket {
        Basket {
            id: record.id.clone(),
            products: record
                .product_ids
                .iter()
                .filter_map(|id| self.products.get(id).cloned())
                .collect(),
            discounts: record
                .discount_ids
                .iter()
                .filter_map(|id| self.discounts.get(id).cloned())
                .collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn code_taken(&self, code: &str, except_id: &str) -> bool {
        self.products
            .values()
            .any(|p| p.code == code && p.id != except_id)
    }
}

/// A thread-safe store holding everything in process memory.
///
/// Implements every store trait, so one instance can back all three services.
/// Cloning is cheap and clones share the same data.
///
/// ## Usage
/// ```rust
/// use std::sync::Arc;
/// use basket_core::{BasketService, InMemoryStore};
///
/// let store = Arc::new(InMemoryStore::new());
/// let service = BasketService::new(store.clone(), store.clone(), store);
/// # let _ = service;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CoreError::Storage("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CoreError::Storage("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BasketStore for InMemoryStore {
    async fn list_all(&self) -> CoreResult<Vec<Basket>> {
        let tables = self.read()?;
        let mut records: Vec<&BasketRecord> = tables.baskets.values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records.into_iter().map(|r| tables.resolve(r)).collect())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Basket>> {
        let tables = self.read()?;
        Ok(tables.baskets.get(id).map(|r| tables.resolve(r)))
    }

    async fn create(&self, basket: Basket) -> CoreResult<Basket> {
        let mut tables = self.write()?;
        let record = BasketRecord::from(&basket);
        let stored = tables.resolve(&record);
        tables.baskets.insert(record.id.clone(), record);
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.write()?.baskets.remove(id).is_some())
    }

    async fn save(&self, basket: &Basket) -> CoreResult<()> {
        let record = BasketRecord::from(basket);
        self.write()?.baskets.insert(record.id.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl ProductLookup for InMemoryStore {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        Ok(self.read()?.products.get(id).cloned())
    }

    async fn by_code(&self, code: &str) -> CoreResult<Option<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.code == code)
            .cloned())
    }
}

#[async_trait]
impl ProductCatalog for InMemoryStore {
    async fn list(&self) -> CoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self.read()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }

    async fn create(&self, product: Product) -> CoreResult<Product> {
        let mut tables = self.write()?;
        if tables.code_taken(&product.code, &product.id) {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: product.code,
            }
            .into());
        }
        tables.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> CoreResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product.id) {
            return Err(CoreError::ProductNotFound(product.id.clone()));
        }
        if tables.code_taken(&product.code, &product.id) {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: product.code.clone(),
            }
            .into());
        }
        tables.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.write()?.products.remove(id).is_some())
    }
}

#[async_trait]
impl DiscountLookup for InMemoryStore {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Discount>> {
        Ok(self.read()?.discounts.get(id).cloned())
    }
}

#[async_trait]
impl DiscountCatalog for InMemoryStore {
    async fn list(&self) -> CoreResult<Vec<Discount>> {
        let mut discounts: Vec<Discount> = self.read()?.discounts.values().cloned().collect();
        discounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(discounts)
    }

    async fn create(&self, discount: Discount) -> CoreResult<Discount> {
        self.write()?
            .discounts
            .insert(discount.id.clone(), discount.clone());
        Ok(discount)
    }

    async fn update(&self, discount: &Discount) -> CoreResult<()> {
        let mut tables = self.write()?;
        match tables.discounts.get_mut(&discount.id) {
            Some(stored) => {
                *stored = discount.clone();
                Ok(())
            }
            None => Err(CoreError::DiscountNotFound(discount.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.write()?.discounts.remove(id).is_some())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
