//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CoreError (store trait boundary)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (basket-api) ← HTTP status + body                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use basket_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `UPDATE` touched no rows
    /// - `fetch_one` returns no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a product with a code that is already taken
    /// - Renaming a product to a taken code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Saving a basket that references a deleted product or discount
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be decoded into a domain type.
    ///
    /// ## When This Occurs
    /// - A `price` column that is not a decimal string
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if let Some(column) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = column.rsplit('.').next().unwrap_or(column).to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Maps database errors onto the store trait error.
///
/// ```text
/// NotFound(Product)    → CoreError::ProductNotFound
/// NotFound(Discount)   → CoreError::DiscountNotFound
/// NotFound(Basket)     → CoreError::BasketNotFound
/// UniqueViolation      → ValidationError::Duplicate
/// everything else      → CoreError::Storage
/// ```
impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => match entity.as_str() {
                "Product" => CoreError::ProductNotFound(id),
                "Discount" => CoreError::DiscountNotFound(id),
                "Basket" => CoreError::BasketNotFound(id),
                _ => CoreError::Storage(format!("{} not found: {}", entity, id)),
            },
            DbError::UniqueViolation { field, value } => {
                ValidationError::Duplicate { field, value }.into()
            }
            other => CoreError::Storage(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_entity_variant() {
        let core: CoreError = DbError::not_found("Product", "p-1").into();
        assert!(matches!(core, CoreError::ProductNotFound(id) if id == "p-1"));

        let core: CoreError = DbError::not_found("Basket", "b-1").into();
        assert!(matches!(core, CoreError::BasketNotFound(_)));
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let core: CoreError = DbError::duplicate("code", "A0001").into();
        match core {
            CoreError::Validation(ValidationError::Duplicate { field, value }) => {
                assert_eq!(field, "code");
                assert_eq!(value, "A0001");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_map_to_storage() {
        let core: CoreError = DbError::PoolExhausted.into();
        assert!(matches!(core, CoreError::Storage(_)));
    }
}
