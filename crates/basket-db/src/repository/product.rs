//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Price Storage
//! ```text
//! Money("12.99") ──► TEXT '12.99' ──► Money("12.99")
//! ```
//! Prices go in and out as decimal strings. A value that no longer parses is
//! reported as [`DbError::CorruptRow`] instead of being priced as zero.

use async_trait::async_trait;
use basket_core::{CoreResult, Money, Product, ProductCatalog, ProductLookup};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = r#"
    SELECT id, code, price, created_at, updated_at
    FROM products
"#;

// =============================================================================
// Row Type
// =============================================================================

/// A `products` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: String,
    pub code: String,
    pub price: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> DbResult<Product> {
        let price = self
            .price
            .parse::<Money>()
            .map_err(|e| DbError::CorruptRow {
                entity: "Product".to_string(),
                id: self.id.clone(),
                reason: format!("price '{}': {}", self.price, e),
            })?;

        Ok(Product {
            id: self.id,
            code: self.code,
            price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.insert(&Product::new("A0001", Money::from_cents(1299))).await?;
/// let found = repo.get_by_code("A0001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by code.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} ORDER BY code"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Gets a product by its business code (e.g. `A0001`).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE code = ?1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, code, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(product.price.to_string())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e.into(), &product.code))?;

        Ok(product.clone())
    }

    /// Updates code and price of an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New code belongs to another product
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, code = %product.code, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                price = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(product.price.to_string())
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e.into(), &product.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Basket line items referencing it go with it.
    ///
    /// Returns whether a row was deleted.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fills in the offending code on a unique violation; SQLite only names the
/// column.
fn with_code(err: DbError, code: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, code),
        other => other,
    }
}

// =============================================================================
// Store Traits
// =============================================================================

#[async_trait]
impl ProductLookup for ProductRepository {
    async fn by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn by_code(&self, code: &str) -> CoreResult<Option<Product>> {
        Ok(self.get_by_code(code).await?)
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn list(&self) -> CoreResult<Vec<Product>> {
        Ok(self.list_all().await?)
    }

    async fn create(&self, product: Product) -> CoreResult<Product> {
        Ok(self.insert(&product).await?)
    }

    async fn update(&self, product: &Product) -> CoreResult<()> {
        Ok(ProductRepository::update(self, product).await?)
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.delete_by_id(id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
