//! # Product Catalog Repository
//!
//! Catalog CRUD and read views. The catalog owns a product's descriptive
//! attributes; it does **not** own the balance. `weight_g` is settable only
//! at creation (recorded as an opening ledger entry so replay holds from
//! day one) - every later quantity change routes through the ledger. There
//! is deliberately no weight field on [`ProductPatch`].
//!
//! Statuses are a projection of `expiry_date`: read views compute them
//! fresh, and [`ProductRepository::refresh_statuses`] persists them into
//! the cached column for anything that reads the raw table.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::ledger;
use fresco_core::error::Violation;
use fresco_core::expiry::{classify_default, FreshnessStatus};
use fresco_core::{AdjustmentReason, Product, ProductView, StockAdjustment};

// =============================================================================
// Request Types
// =============================================================================

/// Attributes for creating a product.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub supplier: String,
    /// Price per kilogram in cents. Must be > 0.
    pub price_cents: i64,
    /// Opening balance in grams. Must be >= 0. This is the only place a
    /// weight can be set directly.
    pub weight_g: i64,
    /// Low-stock threshold in grams. Must be > 0.
    pub stock_alert_g: i64,
    pub expiry_date: NaiveDate,
}

/// Descriptive attributes for updating a product. No weight on purpose.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProductPatch {
    pub name: String,
    pub category_id: Option<String>,
    pub supplier: String,
    pub price_cents: i64,
    pub stock_alert_g: i64,
    pub expiry_date: NaiveDate,
}

fn validate_attrs(name: &str, price_cents: i64, stock_alert_g: i64) -> Vec<Violation> {
    let mut violations = Vec::new();

    if name.trim().is_empty() {
        violations.push(Violation::Required {
            field: "name".to_string(),
        });
    }
    if price_cents <= 0 {
        violations.push(Violation::MustBePositive {
            field: "price_cents".to_string(),
        });
    }
    if stock_alert_g <= 0 {
        violations.push(Violation::MustBePositive {
            field: "stock_alert_g".to_string(),
        });
    }

    violations
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    ///
    /// Inserts the product row and, when the opening balance is non-zero,
    /// an opening `add` adjustment in the same transaction.
    pub async fn create(&self, attrs: &NewProduct) -> StoreResult<Product> {
        let mut violations = validate_attrs(&attrs.name, attrs.price_cents, attrs.stock_alert_g);
        if attrs.weight_g < 0 {
            violations.push(Violation::Invalid {
                field: "weight_g".to_string(),
                reason: "opening balance cannot be negative".to_string(),
            });
        }
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let now = Utc::now();
        let today = now.date_naive();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: attrs.name.trim().to_string(),
            category_id: attrs.category_id.clone(),
            supplier: attrs.supplier.clone(),
            price_cents: attrs.price_cents,
            weight_g: attrs.weight_g,
            stock_alert_g: attrs.stock_alert_g,
            expiry_date: attrs.expiry_date,
            status: classify_default(attrs.expiry_date, today),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id, supplier,
                price_cents, weight_g, stock_alert_g,
                expiry_date, status, is_deleted,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.supplier)
        .bind(product.price_cents)
        .bind(product.weight_g)
        .bind(product.stock_alert_g)
        .bind(product.expiry_date)
        .bind(product.status)
        .bind(product.is_deleted)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if product.weight_g > 0 {
            let opening = StockAdjustment {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                reason: AdjustmentReason::Add,
                delta_g: product.weight_g,
                notes: Some("opening balance".to_string()),
                created_at: now,
            };
            ledger::append_adjustment(&mut tx, &opening).await?;
        }

        tx.commit().await?;

        Ok(product)
    }

    /// Updates a product's descriptive attributes.
    ///
    /// The balance is untouchable here; the status cache is recomputed
    /// because the expiry date may have changed.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> StoreResult<()> {
        let violations = validate_attrs(&patch.name, patch.price_cents, patch.stock_alert_g);
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let status = classify_default(patch.expiry_date, now.date_naive());

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                supplier = ?4,
                price_cents = ?5,
                stock_alert_g = ?6,
                expiry_date = ?7,
                status = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.name.trim())
        .bind(&patch.category_id)
        .bind(&patch.supplier)
        .bind(patch.price_cents)
        .bind(patch.stock_alert_g)
        .bind(patch.expiry_date)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }

        Ok(())
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, supplier,
                   price_cents, weight_g, stock_alert_g,
                   expiry_date, status, is_deleted,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists catalog read views.
    ///
    /// Each view carries the live ledger-owned balance and a status
    /// computed against today's date, not the cached column.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<ProductView>> {
        self.list_as_of(include_deleted, Utc::now().date_naive()).await
    }

    /// [`list`](Self::list) against an explicit date.
    pub async fn list_as_of(
        &self,
        include_deleted: bool,
        today: NaiveDate,
    ) -> StoreResult<Vec<ProductView>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, supplier,
                   price_cents, weight_g, stock_alert_g,
                   expiry_date, status, is_deleted,
                   created_at, updated_at
            FROM products
            WHERE is_deleted = 0 OR ?1
            ORDER BY name
            "#,
        )
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        Ok(products
            .into_iter()
            .map(|p| ProductView {
                status: classify_default(p.expiry_date, today),
                id: p.id,
                name: p.name,
                category_id: p.category_id,
                supplier: p.supplier,
                price_cents: p.price_cents,
                weight_g: p.weight_g,
                stock_alert_g: p.stock_alert_g,
                expiry_date: p.expiry_date,
                is_deleted: p.is_deleted,
            })
            .collect())
    }

    /// Soft-deletes a product. Balance and history are preserved.
    pub async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        self.set_deleted(id, true).await
    }

    /// Restores a soft-deleted product.
    pub async fn restore(&self, id: &str) -> StoreResult<()> {
        self.set_deleted(id, false).await
    }

    async fn set_deleted(&self, id: &str, deleted: bool) -> StoreResult<()> {
        debug!(id = %id, deleted, "Toggling soft-delete");

        let result = sqlx::query("UPDATE products SET is_deleted = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(deleted)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }

        Ok(())
    }

    /// Re-runs the expiry classifier over all non-deleted products and
    /// persists the refreshed status cache. Idempotent - safe to call any
    /// number of times; returns how many rows actually changed.
    pub async fn refresh_statuses(&self, today: NaiveDate) -> StoreResult<u64> {
        #[derive(sqlx::FromRow)]
        struct StatusRow {
            id: String,
            expiry_date: NaiveDate,
            status: FreshnessStatus,
        }

        let rows = sqlx::query_as::<_, StatusRow>(
            "SELECT id, expiry_date, status FROM products WHERE is_deleted = 0",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut changed = 0u64;
        for row in rows {
            let fresh = classify_default(row.expiry_date, today);
            if fresh != row.status {
                sqlx::query("UPDATE products SET status = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(&row.id)
                    .bind(fresh)
                    .bind(Utc::now())
                    .execute(&self.pool)
                    .await?;
                changed += 1;
            }
        }

        info!(changed, "Status refresh complete");
        Ok(changed)
    }

    /// Counts non-deleted products (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
