//! # Basket Repository
//!
//! Database operations for baskets and their memberships.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Basket Persistence                              │
//! │                                                                         │
//! │  baskets           id, created_at, updated_at                          │
//! │     │                                                                   │
//! │     ├── basket_items      (basket_id, position) ──► products.id        │
//! │     │       one row per line item, duplicates allowed                  │
//! │     │                                                                   │
//! │     └── basket_discounts  (basket_id, discount_id), position           │
//! │             one row per attached discount, unique per basket           │
//! │                                                                         │
//! │  save(basket) = one transaction:                                       │
//! │     upsert baskets row                                                 │
//! │     DELETE memberships ──► INSERT memberships in order                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading joins the memberships back to the catalog, so a basket always
//! reflects current prices and loses products or discounts that were deleted.

use async_trait::async_trait;
use basket_core::{Basket, BasketStore, CoreResult, Discount, Product};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::discount::DiscountRow;
use crate::repository::product::ProductRow;

/// A `baskets` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
struct BasketRow {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for basket database operations.
#[derive(Debug, Clone)]
pub struct BasketRepository {
    pool: SqlitePool,
}

impl BasketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BasketRepository { pool }
    }

    /// Lists every basket with its contents, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Basket>> {
        let rows = sqlx::query_as::<_, BasketRow>(
            "SELECT id, created_at, updated_at FROM baskets ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut baskets = Vec::with_capacity(rows.len());
        for row in rows {
            baskets.push(self.load(row).await?);
        }
        Ok(baskets)
    }

    /// Gets a basket with its line items and discounts.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Basket>> {
        let row = sqlx::query_as::<_, BasketRow>(
            "SELECT id, created_at, updated_at FROM baskets WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    /// Inserts a new basket together with any memberships it already has.
    pub async fn insert(&self, basket: &Basket) -> DbResult<()> {
        debug!(id = %basket.id, "Inserting basket");

        let mut tx = self.begin().await?;

        sqlx::query("INSERT INTO baskets (id, created_at, updated_at) VALUES (?1, ?2, ?3)")
            .bind(&basket.id)
            .bind(basket.created_at)
            .bind(basket.updated_at)
            .execute(&mut *tx)
            .await?;

        write_memberships(&mut tx, basket).await?;

        commit(tx).await
    }

    /// Writes the basket row and replaces its memberships atomically.
    pub async fn save(&self, basket: &Basket) -> DbResult<()> {
        debug!(
            id = %basket.id,
            items = basket.products.len(),
            discounts = basket.discounts.len(),
            "Saving basket"
        );

        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO baskets (id, created_at, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(&basket.id)
        .bind(basket.created_at)
        .bind(basket.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM basket_items WHERE basket_id = ?1")
            .bind(&basket.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM basket_discounts WHERE basket_id = ?1")
            .bind(&basket.id)
            .execute(&mut *tx)
            .await?;

        write_memberships(&mut tx, basket).await?;

        commit(tx).await
    }

    /// Deletes a basket and its memberships. Returns whether it existed.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting basket");

        let result = sqlx::query("DELETE FROM baskets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load(&self, row: BasketRow) -> DbResult<Basket> {
        let products = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.code, p.price, p.created_at, p.updated_at
            FROM basket_items bi
            INNER JOIN products p ON p.id = bi.product_id
            WHERE bi.basket_id = ?1
            ORDER BY bi.position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ProductRow::into_product)
        .collect::<DbResult<Vec<Product>>>()?;

        let discounts = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT d.id, d.discount_type, d.product_code, d.created_at, d.updated_at
            FROM basket_discounts bd
            INNER JOIN discounts d ON d.id = bd.discount_id
            WHERE bd.basket_id = ?1
            ORDER BY bd.position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Discount::from)
        .collect();

        Ok(Basket {
            id: row.id,
            products,
            discounts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

async fn write_memberships(tx: &mut Transaction<'static, Sqlite>, basket: &Basket) -> DbResult<()> {
    for (position, product) in basket.products.iter().enumerate() {
        sqlx::query("INSERT INTO basket_items (basket_id, position, product_id) VALUES (?1, ?2, ?3)")
            .bind(&basket.id)
            .bind(position as i64)
            .bind(&product.id)
            .execute(&mut **tx)
            .await?;
    }

    for (position, discount) in basket.discounts.iter().enumerate() {
        sqlx::query(
            "INSERT INTO basket_discounts (basket_id, discount_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(&basket.id)
        .bind(&discount.id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

#[async_trait]
impl BasketStore for BasketRepository {
    async fn list_all(&self) -> CoreResult<Vec<Basket>> {
        Ok(BasketRepository::list_all(self).await?)
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Basket>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn create(&self, basket: Basket) -> CoreResult<Basket> {
        self.insert(&basket).await?;
        Ok(self
            .get_by_id(&basket.id)
            .await?
            .ok_or_else(|| DbError::not_found("Basket", &basket.id))?)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.delete_by_id(id).await?)
    }

    async fn save(&self, basket: &Basket) -> CoreResult<()> {
        Ok(BasketRepository::save(self, basket).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use basket_core::{
        BasketService, CoreError, DiscountType, Money, ProductCatalog,
    };
    use std::sync::Arc;

    async fn seeded() -> (Database, Product, Product, Discount, Discount) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a1 = db
            .products()
            .insert(&Product::new("A0001", Money::from_cents(1299)))
            .await
            .unwrap();
        let a2 = db
            .products()
            .insert(&Product::new("A0002", Money::from_cents(399)))
            .await
            .unwrap();
        let ten = db
            .discounts()
            .insert(&Discount::new(DiscountType::TenPercentOff, "A0001"))
            .await
            .unwrap();
        let bogo = db
            .discounts()
            .insert(&Discount::new(DiscountType::BuyOneGetOneFree, "A0002"))
            .await
            .unwrap();
        (db, a1, a2, ten, bogo)
    }

    #[tokio::test]
    async fn test_round_trips_line_order_and_discounts() {
        let (db, a1, a2, ten, bogo) = seeded().await;
        let repo = db.baskets();

        let mut basket = Basket::new();
        repo.insert(&basket).await.unwrap();
        for product in [&a2, &a1, &a2, &a1, &a2] {
            basket.add_product(product.clone());
        }
        basket.add_discount(bogo.clone());
        basket.add_discount(ten.clone());
        repo.save(&basket).await.unwrap();

        let loaded = repo.get_by_id(&basket.id).await.unwrap().unwrap();
        let codes: Vec<&str> = loaded.products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, ["A0002", "A0001", "A0002", "A0001", "A0002"]);
        let discount_ids: Vec<&str> = loaded.discounts.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(discount_ids, [bogo.id.as_str(), ten.id.as_str()]);

        // 2 x 12.99 less 10% + 3 x 3.99 with one free
        assert_eq!(loaded.total().to_string(), "31.36");
    }

    #[tokio::test]
    async fn test_save_replaces_memberships() {
        let (db, a1, _a2, ten, _bogo) = seeded().await;
        let repo = db.baskets();

        let mut basket = Basket::new();
        basket.add_product(a1.clone());
        basket.add_product(a1.clone());
        basket.add_discount(ten.clone());
        repo.insert(&basket).await.unwrap();

        basket.remove_product(&a1.id);
        basket.remove_discount(&ten.id);
        repo.save(&basket).await.unwrap();

        let loaded = repo.get_by_id(&basket.id).await.unwrap().unwrap();
        assert_eq!(loaded.item_count(), 1);
        assert!(loaded.discounts.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_deletes_cascade_into_baskets() {
        let (db, a1, a2, ten, _bogo) = seeded().await;
        let repo = db.baskets();

        let mut basket = Basket::new();
        basket.add_product(a1.clone());
        basket.add_product(a2.clone());
        basket.add_discount(ten.clone());
        repo.insert(&basket).await.unwrap();

        db.products().delete_by_id(&a1.id).await.unwrap();
        db.discounts().delete_by_id(&ten.id).await.unwrap();

        let loaded = repo.get_by_id(&basket.id).await.unwrap().unwrap();
        assert_eq!(loaded.products, vec![a2]);
        assert!(loaded.discounts.is_empty());
    }

    #[tokio::test]
    async fn test_price_changes_are_visible() {
        let (db, mut a1, _a2, _ten, _bogo) = seeded().await;
        let repo = db.baskets();

        let mut basket = Basket::new();
        basket.add_product(a1.clone());
        repo.insert(&basket).await.unwrap();

        a1.price = Money::from_cents(1000);
        db.products().update(&a1).await.unwrap();

        let loaded = repo.get_by_id(&basket.id).await.unwrap().unwrap();
        assert_eq!(loaded.total().to_string(), "10.00");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let (db, ..) = seeded().await;
        let repo = db.baskets();

        let first = Basket::new();
        let second = Basket::new();
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();
        assert_eq!(repo.list_all().await.unwrap().len(), 2);

        assert!(repo.delete_by_id(&first.id).await.unwrap());
        assert!(!repo.delete_by_id(&first.id).await.unwrap());
        assert!(repo.get_by_id(&first.id).await.unwrap().is_none());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_service_over_sqlite() {
        let (db, a1, a2, ten, bogo) = seeded().await;
        let products = Arc::new(db.products());
        let service = BasketService::new(
            Arc::new(db.baskets()),
            products.clone(),
            Arc::new(db.discounts()),
        );
        let a3 = ProductCatalog::create(
            products.as_ref(),
            Product::new("A0003", Money::from_cents(999)),
        )
        .await
        .unwrap();

        let basket = service.create_basket().await.unwrap();
        service.add_product(&basket.id, &a1.id).await.unwrap();
        service.scan_product(&basket.id, "A0001").await.unwrap();
        for _ in 0..3 {
            service.add_product(&basket.id, &a2.id).await.unwrap();
        }
        service.add_product(&basket.id, &a3.id).await.unwrap();
        service.add_discount(&basket.id, &ten.id).await.unwrap();
        service.add_discount(&basket.id, &bogo.id).await.unwrap();

        let total = service.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total.to_string(), "41.35");

        let err = service.calculate_total("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::BasketNotFound(_)));
    }
}
