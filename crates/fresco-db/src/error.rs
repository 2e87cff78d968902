//! # Database Error Types
//!
//! Errors for store operations, categorized so the presentation layer can
//! render an actionable message for every rejection.
//!
//! ## Taxonomy
//! - `Validation` - a business rule was violated; carries every violated
//!   rule, not just the first
//! - `InsufficientStock` - the authoritative ledger check failed; carries
//!   the current true balance
//! - `NotFound` - unknown product/category/sale id
//! - `Conflict` - a concurrent writer held the database; retriable by the
//!   caller, distinct from InsufficientStock
//! - everything else - persistence failures, fatal to the current request,
//!   never retried automatically

use thiserror::Error;

use fresco_core::error::{join_violations, CoreError, Violation};

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One or more business rules were violated. Contains every violation
    /// so the caller can show a complete correction list.
    #[error("validation failed: {}", join_violations(violations))]
    Validation { violations: Vec<Violation> },

    /// The ledger's authoritative check rejected a decrement. Carries the
    /// balance as of the failed attempt, never a stale snapshot.
    #[error("insufficient stock for {product_id}: available {available_g} g, requested {requested_g} g")]
    InsufficientStock {
        product_id: String,
        available_g: i64,
        requested_g: i64,
    },

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate category name, receipt_no).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Lost a race against a concurrent writer (SQLITE_BUSY). The request
    /// made no changes and may be retried by the caller.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Wraps a non-empty violation list.
    pub fn validation(violations: Vec<Violation>) -> Self {
        StoreError::Validation { violations }
    }
}

/// Maps sqlx errors onto the store taxonomy.
///
/// SQLite reports constraint failures as message text; busy/locked means a
/// concurrent writer held the database and surfaces as `Conflict`.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation { message: msg }
                } else if msg.contains("database is locked") || msg.contains("database table is locked")
                {
                    StoreError::Conflict(msg)
                } else {
                    StoreError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { violations } => StoreError::Validation { violations },
            CoreError::InsufficientStock {
                product_id,
                available_g,
                requested_g,
            } => StoreError::InsufficientStock {
                product_id,
                available_g,
                requested_g,
            },
            CoreError::ProductNotFound(id) => StoreError::not_found("product", id),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
