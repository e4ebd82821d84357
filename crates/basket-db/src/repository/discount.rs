//! # Discount Repository
//!
//! Database operations for discount rules.
//!
//! The type column holds the wire name (`TEN_PERCENT_OFF`, `BUY_1_GET_1_FREE`).
//! Names this build doesn't recognize load as `DiscountType::Unknown`, which
//! the pricing engine treats as no discount.

use async_trait::async_trait;
use basket_core::{CoreResult, Discount, DiscountCatalog, DiscountLookup, DiscountType};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_DISCOUNT: &str = r#"
    SELECT id, discount_type, product_code, created_at, updated_at
    FROM discounts
"#;

/// A `discounts` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct DiscountRow {
    pub id: String,
    pub discount_type: String,
    pub product_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DiscountRow> for Discount {
    fn from(row: DiscountRow) -> Self {
        Discount {
            id: row.id,
            discount_type: DiscountType::from_wire(&row.discount_type),
            product_code: row.product_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for discount database operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Lists every discount, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Discount>> {
        let rows = sqlx::query_as::<_, DiscountRow>(&format!(
            "{SELECT_DISCOUNT} ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Discount::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>(&format!("{SELECT_DISCOUNT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Discount::from))
    }

    pub async fn insert(&self, discount: &Discount) -> DbResult<Discount> {
        debug!(
            discount_type = %discount.discount_type,
            product_code = %discount.product_code,
            "Inserting discount"
        );

        sqlx::query(
            r#"
            INSERT INTO discounts (id, discount_type, product_code, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&discount.id)
        .bind(discount.discount_type.as_str())
        .bind(&discount.product_code)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(discount.clone())
    }

    /// Updates type and target code of an existing discount.
    pub async fn update(&self, discount: &Discount) -> DbResult<()> {
        debug!(id = %discount.id, "Updating discount");

        let result = sqlx::query(
            r#"
            UPDATE discounts SET
                discount_type = ?2,
                product_code = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&discount.id)
        .bind(discount.discount_type.as_str())
        .bind(&discount.product_code)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", &discount.id));
        }

        Ok(())
    }

    /// Deletes a discount and detaches it from every basket.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting discount");

        let result = sqlx::query("DELETE FROM discounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DiscountLookup for DiscountRepository {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Discount>> {
        Ok(self.get_by_id(id).await?)
    }
}

#[async_trait]
impl DiscountCatalog for DiscountRepository {
    async fn list(&self) -> CoreResult<Vec<Discount>> {
        Ok(self.list_all().await?)
    }

    async fn create(&self, discount: Discount) -> CoreResult<Discount> {
        Ok(self.insert(&discount).await?)
    }

    async fn update(&self, discount: &Discount) -> CoreResult<()> {
        Ok(DiscountRepository::update(self, discount).await?)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.delete_by_id(id).await?)
    }
}
