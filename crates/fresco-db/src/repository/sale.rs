//! # Sale Transaction Engine
//!
//! All-or-nothing checkout. A commit runs in three phases:
//!
//! 1. **Snapshot** - read the live catalog (prices, names, balances) outside
//!    any transaction.
//! 2. **Validate** - run the pure cart validator against the snapshot. This
//!    rejects bad carts early with the complete violation list and freezes
//!    per-line prices.
//! 3. **Commit** - one transaction: a guarded ledger decrement plus a `sale`
//!    adjustment row per line (lines ordered by product id so concurrent
//!    commits acquire rows in the same order), then the sale and its item
//!    rows. Any failure rolls the whole thing back.
//!
//! The snapshot may be stale by the time the transaction runs; the ledger
//! guard re-checks every decrement against the live balance, so of two
//! racing commits over the same last kilogram exactly one succeeds and the
//! other fails with the true remaining balance. Committed sales are
//! immutable: no update or delete exists on this repository.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::ledger;
use fresco_core::cart::{self, CartLine, StockSnapshot};
use fresco_core::{AdjustmentReason, Sale, SaleItem, StockAdjustment};

// =============================================================================
// Request / Response Types
// =============================================================================

/// A checkout request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SaleRequest {
    pub lines: Vec<CartLine>,
    /// Whole-percent discount, 0-100.
    pub discount_pct: i64,
    pub amount_paid_cents: i64,
}

/// A committed sale with its line items.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: String,
    name: String,
    price_cents: i64,
    weight_g: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a sale.
    ///
    /// Fails with `Validation` when the cart is malformed, and with
    /// `InsufficientStock` (carrying the live balance) when a racing commit
    /// took the stock between snapshot and transaction. On any failure no
    /// row is written and no balance moves.
    pub async fn commit(&self, req: &SaleRequest) -> StoreResult<SaleReceipt> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT id, name, price_cents, weight_g FROM products WHERE is_deleted = 0",
        )
        .fetch_all(&self.pool)
        .await?;

        let snapshot: Vec<StockSnapshot> = rows
            .iter()
            .map(|r| StockSnapshot {
                product_id: r.id.clone(),
                price_cents: r.price_cents,
                available_g: r.weight_g,
            })
            .collect();

        let totals = cart::validate(&req.lines, req.discount_pct, req.amount_paid_cents, &snapshot)
            .map_err(StoreError::validation)?;

        debug!(
            lines = totals.lines.len(),
            total_cents = totals.total_cents,
            "Committing sale"
        );

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        let mut priced = totals.lines;
        // deterministic acquisition order across concurrent commits
        priced.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        let mut tx = self.pool.begin().await?;

        for line in &priced {
            ledger::apply_delta(&mut tx, &line.product_id, -line.weight_g, now).await?;
            ledger::append_adjustment(
                &mut tx,
                &StockAdjustment {
                    id: Uuid::new_v4().to_string(),
                    product_id: line.product_id.clone(),
                    reason: AdjustmentReason::Sale,
                    delta_g: -line.weight_g,
                    notes: Some(format!("sale {sale_id}")),
                    created_at: now,
                },
            )
            .await?;
        }

        let receipt_no = next_receipt_no(&mut tx, now).await?;

        let sale = Sale {
            id: sale_id.clone(),
            receipt_no,
            subtotal_cents: totals.subtotal_cents,
            discount_pct: totals.discount_pct,
            total_cents: totals.total_cents,
            amount_paid_cents: totals.amount_paid_cents,
            change_cents: totals.change_cents,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_no, subtotal_cents, discount_pct,
                total_cents, amount_paid_cents, change_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_no)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_pct)
        .bind(sale.total_cents)
        .bind(sale.amount_paid_cents)
        .bind(sale.change_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.len());
        for line in &priced {
            // freeze name and price as sold; later catalog edits must not
            // rewrite history
            let name_snapshot = rows
                .iter()
                .find(|r| r.id == line.product_id)
                .map(|r| r.name.clone())
                .unwrap_or_default();

            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot,
                price_per_kg_cents: line.price_per_kg_cents,
                weight_g: line.weight_g,
                line_total_cents: line.line_total_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, name_snapshot,
                    price_per_kg_cents, weight_g, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.price_per_kg_cents)
            .bind(item.weight_g)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(receipt_no = %sale.receipt_no, total_cents = sale.total_cents, "Sale committed");

        Ok(SaleReceipt { sale, items })
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_no, subtotal_cents, discount_pct,
                   total_cents, amount_paid_cents, change_cents, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Line items of a sale.
    pub async fn items_of(&self, sale_id: &str) -> StoreResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name_snapshot,
                   price_per_kg_cents, weight_g, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> StoreResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_no, subtotal_cents, discount_pct,
                   total_cents, amount_paid_cents, change_cents, created_at
            FROM sales
            ORDER BY created_at DESC, receipt_no DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

/// Allocates the next `YYYYMMDD-NNNN` receipt number inside the commit
/// transaction. The UNIQUE constraint on `receipt_no` backstops the count
/// if two transactions ever race past each other.
async fn next_receipt_no(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    now: chrono::DateTime<Utc>,
) -> StoreResult<String> {
    let day = now.format("%Y%m%d").to_string();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE receipt_no LIKE ?1")
        .bind(format!("{day}-%"))
        .fetch_one(&mut **tx)
        .await?;

    Ok(format!("{day}-{:04}", count + 1))
}

// =============================================================================
// Unit Tests
// =============================================================================
