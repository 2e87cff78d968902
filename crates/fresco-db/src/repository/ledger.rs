//! # Stock Ledger Repository
//!
//! Single source of truth for per-product quantity on hand.
//!
//! Every mutation follows the same shape, inside one transaction:
//!
//! 1. a guarded delta UPDATE on `products.weight_g` - the guard
//!    (`weight_g + delta >= 0`) is evaluated by SQLite against the *live*
//!    row, so a stale snapshot in the caller's hands can never overdraw
//!    stock;
//! 2. an append to `stock_adjustments`.
//!
//! Because both always happen together, replaying a product's adjustment
//! history from zero equals its current balance at any point in time.
//! That invariant is testable via [`LedgerRepository::replayed_balance`].
//!
//! UI-level quantity checks are advisory; this is the authoritative guard.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use fresco_core::error::Violation;
use fresco_core::{AdjustmentReason, StockAdjustment};

// =============================================================================
// Request / Response Types
// =============================================================================

/// A manual stock adjustment request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdjustStockRequest {
    pub product_id: String,
    /// `Add` or `Remove`. `Sale` rows are written only by the sale engine.
    pub reason: AdjustmentReason,
    /// Signed grams: positive for additions, negative for removals.
    pub delta_g: i64,
    pub notes: Option<String>,
}

/// Result of a successful adjustment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdjustmentOutcome {
    pub adjustment: StockAdjustment,
    /// The balance after the adjustment, in grams.
    pub new_weight_g: i64,
}

fn validate_request(req: &AdjustStockRequest) -> Vec<Violation> {
    let mut violations = Vec::new();

    if req.product_id.trim().is_empty() {
        violations.push(Violation::Required {
            field: "product_id".to_string(),
        });
    }
    if req.delta_g == 0 {
        violations.push(Violation::Invalid {
            field: "delta_g".to_string(),
            reason: "adjustment must move a non-zero weight".to_string(),
        });
    }
    match req.reason {
        AdjustmentReason::Add if req.delta_g < 0 => violations.push(Violation::Invalid {
            field: "delta_g".to_string(),
            reason: "additions must have a positive delta".to_string(),
        }),
        AdjustmentReason::Remove if req.delta_g > 0 => violations.push(Violation::Invalid {
            field: "delta_g".to_string(),
            reason: "removals must have a negative delta".to_string(),
        }),
        AdjustmentReason::Sale => violations.push(Violation::Invalid {
            field: "reason".to_string(),
            reason: "sale adjustments are written by the sale engine".to_string(),
        }),
        _ => {}
    }

    violations
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Applies a signed manual adjustment atomically.
    ///
    /// Fails with `InsufficientStock` (carrying the current true balance)
    /// if the delta would drive the balance negative; the balance is never
    /// silently clamped and nothing is written on failure. Retries are the
    /// caller's decision.
    pub async fn adjust(&self, req: &AdjustStockRequest) -> StoreResult<AdjustmentOutcome> {
        let violations = validate_request(req);
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        debug!(product_id = %req.product_id, delta_g = %req.delta_g, reason = ?req.reason, "Adjusting stock");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        apply_delta(&mut tx, &req.product_id, req.delta_g, now).await?;

        let adjustment = StockAdjustment {
            id: Uuid::new_v4().to_string(),
            product_id: req.product_id.clone(),
            reason: req.reason,
            delta_g: req.delta_g,
            notes: req.notes.clone(),
            created_at: now,
        };
        append_adjustment(&mut tx, &adjustment).await?;

        let new_weight_g: i64 = sqlx::query_scalar("SELECT weight_g FROM products WHERE id = ?1")
            .bind(&req.product_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(product_id = %req.product_id, new_weight_g, "Stock adjusted");

        Ok(AdjustmentOutcome {
            adjustment,
            new_weight_g,
        })
    }

    /// Current balance in grams.
    pub async fn balance_of(&self, product_id: &str) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT weight_g FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("product", product_id))
    }

    /// Balance reconstructed by replaying the adjustment history from zero.
    ///
    /// Must always equal [`balance_of`](Self::balance_of); a divergence is
    /// a consistency bug.
    pub async fn replayed_balance(&self, product_id: &str) -> StoreResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(delta_g) FROM stock_adjustments WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.unwrap_or(0))
    }

    /// Adjustment history for a product, newest first.
    pub async fn history(&self, product_id: &str) -> StoreResult<Vec<StockAdjustment>> {
        let rows = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT id, product_id, reason, delta_g, notes, created_at
            FROM stock_adjustments
            WHERE product_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================
// Used by this repository and by the sale engine, which runs the same
// guarded delta for every cart line inside its own transaction.

/// Applies a guarded signed delta to a product's balance.
///
/// `rows_affected == 0` means either the product doesn't exist or the guard
/// rejected the delta; the follow-up read distinguishes the two and puts
/// the live balance into the error.
pub(crate) async fn apply_delta(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    delta_g: i64,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET weight_g = weight_g + ?1, updated_at = ?2
        WHERE id = ?3 AND weight_g + ?1 >= 0
        "#,
    )
    .bind(delta_g)
    .bind(now)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        let available: Option<i64> = sqlx::query_scalar("SELECT weight_g FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

        return Err(match available {
            None => StoreError::not_found("product", product_id),
            Some(available_g) => StoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available_g,
                requested_g: delta_g.abs(),
            },
        });
    }

    Ok(())
}

/// Appends one row to the adjustment history.
pub(crate) async fn append_adjustment(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    adjustment: &StockAdjustment,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_adjustments (id, product_id, reason, delta_g, notes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&adjustment.id)
    .bind(&adjustment.product_id)
    .bind(adjustment.reason)
    .bind(adjustment.delta_g)
    .bind(&adjustment.notes)
    .bind(adjustment.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::product::NewProduct;
    use chrono::NaiveDate;

    async fn store_with_product(opening_g: i64) -> (Store, String) {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let product = store
            .products()
            .create(&NewProduct {
                name: "Gorgonzola".to_string(),
                category_id: None,
                supplier: "Caseificio Nero".to_string(),
                price_cents: 12_500,
                weight_g: opening_g,
                stock_alert_g: 500,
                expiry_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            })
            .await
            .unwrap();
        (store, product.id)
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let (store, id) = store_with_product(1000).await;
        let ledger = store.ledger();

        let out = ledger
            .adjust(&AdjustStockRequest {
                product_id: id.clone(),
                reason: AdjustmentReason::Add,
                delta_g: 500,
                notes: Some("delivery".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(out.new_weight_g, 1500);

        let out = ledger
            .adjust(&AdjustStockRequest {
                product_id: id.clone(),
                reason: AdjustmentReason::Remove,
                delta_g: -300,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(out.new_weight_g, 1200);
        assert_eq!(ledger.balance_of(&id).await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_overdraw_rejected_without_effect() {
        let (store, id) = store_with_product(300).await;
        let ledger = store.ledger();

        let err = ledger
            .adjust(&AdjustStockRequest {
                product_id: id.clone(),
                reason: AdjustmentReason::Remove,
                delta_g: -500,
                notes: None,
            })
            .await
            .unwrap_err();

        match err {
            StoreError::InsufficientStock {
                available_g,
                requested_g,
                ..
            } => {
                assert_eq!(available_g, 300);
                assert_eq!(requested_g, 500);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // no partial effect: balance and history untouched
        assert_eq!(ledger.balance_of(&id).await.unwrap(), 300);
        assert_eq!(ledger.replayed_balance(&id).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (store, _) = store_with_product(100).await;
        let err = store
            .ledger()
            .adjust(&AdjustStockRequest {
                product_id: "nope".to_string(),
                reason: AdjustmentReason::Add,
                delta_g: 100,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_replay_equals_balance_after_mixed_history() {
        let (store, id) = store_with_product(2000).await;
        let ledger = store.ledger();

        for (reason, delta) in [
            (AdjustmentReason::Add, 750),
            (AdjustmentReason::Remove, -250),
            (AdjustmentReason::Add, 100),
            (AdjustmentReason::Remove, -600),
        ] {
            ledger
                .adjust(&AdjustStockRequest {
                    product_id: id.clone(),
                    reason,
                    delta_g: delta,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let balance = ledger.balance_of(&id).await.unwrap();
        assert_eq!(balance, 2000);
        assert_eq!(ledger.replayed_balance(&id).await.unwrap(), balance);

        // opening entry + four manual entries
        assert_eq!(ledger.history(&id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_sale_reason_and_sign_mismatch_rejected() {
        let (store, id) = store_with_product(1000).await;
        let ledger = store.ledger();

        let err = ledger
            .adjust(&AdjustStockRequest {
                product_id: id.clone(),
                reason: AdjustmentReason::Sale,
                delta_g: -100,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let err = ledger
            .adjust(&AdjustStockRequest {
                product_id: id,
                reason: AdjustmentReason::Add,
                delta_g: -100,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }
}
