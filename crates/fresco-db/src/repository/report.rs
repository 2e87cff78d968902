//! # Report Aggregation
//!
//! Read-only rollups over committed history: sales summaries, per-day
//! revenue, top products by weight sold, adjustment totals, and a live
//! inventory snapshot. Nothing here writes; reports run against whatever
//! has committed and an empty window yields zeroed summaries, not errors.
//!
//! Windows are inclusive calendar-date ranges evaluated against each row's
//! `created_at` date. Optional filters are pushed into SQL with the
//! `(?n IS NULL OR col = ?n)` pattern so every query stays static.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use fresco_core::AdjustmentReason;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// A single-day window.
    pub fn day(date: NaiveDate) -> Self {
        ReportWindow {
            start: date,
            end: date,
        }
    }
}

/// Optional report filters. `None` means "don't filter".
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReportFilters {
    pub category_id: Option<String>,
    pub product_id: Option<String>,
    pub reason: Option<AdjustmentReason>,
}

/// Sale count and revenue over a window.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub revenue_cents: i64,
}

/// One day of the revenue series. Days without sales are absent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct DayRevenue {
    pub day: NaiveDate,
    pub sale_count: i64,
    pub revenue_cents: i64,
}

/// One product's standing in the top-sellers rollup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub weight_sold_g: i64,
    pub revenue_cents: i64,
}

/// Adjustment totals over a window, split by reason. All magnitudes are
/// positive grams.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct AdjustmentSummary {
    pub added_g: i64,
    pub removed_g: i64,
    pub sold_g: i64,
}

/// Current-state inventory rollup (not windowed).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventorySnapshot {
    /// Products with 0 < balance <= their alert threshold.
    pub low_stock_count: i64,
    /// Products with a zero balance.
    pub out_of_stock_count: i64,
    /// Σ balance x price per kg, rounded to cents per product.
    pub valuation_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sale count and revenue over the window.
    pub async fn sales_summary(&self, window: ReportWindow) -> StoreResult<SalesSummary> {
        debug!(start = %window.start, end = %window.end, "Running sales summary");

        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT COUNT(*) AS sale_count,
                   COALESCE(SUM(total_cents), 0) AS revenue_cents
            FROM sales
            WHERE date(created_at) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Per-day revenue series over the window, oldest day first.
    pub async fn revenue_by_day(&self, window: ReportWindow) -> StoreResult<Vec<DayRevenue>> {
        let series = sqlx::query_as::<_, DayRevenue>(
            r#"
            SELECT date(created_at) AS day,
                   COUNT(*) AS sale_count,
                   COALESCE(SUM(total_cents), 0) AS revenue_cents
            FROM sales
            WHERE date(created_at) BETWEEN ?1 AND ?2
            GROUP BY date(created_at)
            ORDER BY day
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(series)
    }

    /// Top `limit` products by weight sold over the window.
    ///
    /// Honors the category and product filters; the name shown is the
    /// snapshot from the most recent sale, so it survives catalog deletes.
    pub async fn top_products(
        &self,
        window: ReportWindow,
        filters: &ReportFilters,
        limit: i64,
    ) -> StoreResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT si.product_id AS product_id,
                   MAX(si.name_snapshot) AS name,
                   SUM(si.weight_g) AS weight_sold_g,
                   SUM(si.line_total_cents) AS revenue_cents
            FROM sale_items si
            LEFT JOIN products p ON p.id = si.product_id
            WHERE date(si.created_at) BETWEEN ?1 AND ?2
              AND (?3 IS NULL OR p.category_id = ?3)
              AND (?4 IS NULL OR si.product_id = ?4)
            GROUP BY si.product_id
            ORDER BY weight_sold_g DESC, revenue_cents DESC
            LIMIT ?5
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(&filters.category_id)
        .bind(&filters.product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Adjustment totals over the window, split added / removed / sold.
    ///
    /// Honors the product and reason filters; a reason filter zeroes the
    /// other buckets.
    pub async fn adjustment_summary(
        &self,
        window: ReportWindow,
        filters: &ReportFilters,
    ) -> StoreResult<AdjustmentSummary> {
        let summary = sqlx::query_as::<_, AdjustmentSummary>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN reason = 'add' THEN delta_g ELSE 0 END), 0) AS added_g,
                   COALESCE(SUM(CASE WHEN reason = 'remove' THEN -delta_g ELSE 0 END), 0) AS removed_g,
                   COALESCE(SUM(CASE WHEN reason = 'sale' THEN -delta_g ELSE 0 END), 0) AS sold_g
            FROM stock_adjustments
            WHERE date(created_at) BETWEEN ?1 AND ?2
              AND (?3 IS NULL OR product_id = ?3)
              AND (?4 IS NULL OR reason = ?4)
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(&filters.product_id)
        .bind(filters.reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Live inventory rollup over non-deleted products.
    pub async fn inventory_snapshot(
        &self,
        filters: &ReportFilters,
    ) -> StoreResult<InventorySnapshot> {
        #[derive(sqlx::FromRow)]
        struct Row {
            weight_g: i64,
            price_cents: i64,
            stock_alert_g: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT weight_g, price_cents, stock_alert_g
            FROM products
            WHERE is_deleted = 0
              AND (?1 IS NULL OR category_id = ?1)
            "#,
        )
        .bind(&filters.category_id)
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = InventorySnapshot {
            low_stock_count: 0,
            out_of_stock_count: 0,
            valuation_cents: 0,
        };

        for row in rows {
            if row.weight_g == 0 {
                snapshot.out_of_stock_count += 1;
            } else if row.weight_g <= row.stock_alert_g {
                snapshot.low_stock_count += 1;
            }
            // same cent-gram rounding a sale line would get
            let cg = row.weight_g as i128 * row.price_cents as i128;
            snapshot.valuation_cents += ((cg + 500) / 1000) as i64;
        }

        Ok(snapshot)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::ledger::AdjustStockRequest;
    use crate::repository::product::NewProduct;
    use crate::repository::sale::SaleRequest;
    use chrono::{Days, Utc};
    use fresco_core::cart::CartLine;

    async fn seeded_store() -> (Store, String, String) {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        let expiry = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let cheese = store
            .products()
            .create(&NewProduct {
                name: "Asiago".to_string(),
                category_id: None,
                supplier: "Caseificio Rosso".to_string(),
                price_cents: 10_000,
                weight_g: 4_000,
                stock_alert_g: 1_000,
                expiry_date: expiry,
            })
            .await
            .unwrap();
        let ham = store
            .products()
            .create(&NewProduct {
                name: "Speck".to_string(),
                category_id: None,
                supplier: "Salumificio Bianchi".to_string(),
                price_cents: 20_000,
                weight_g: 2_000,
                stock_alert_g: 1_000,
                expiry_date: expiry,
            })
            .await
            .unwrap();

        (store, cheese.id, ham.id)
    }

    fn today_window() -> ReportWindow {
        ReportWindow::day(Utc::now().date_naive())
    }

    #[tokio::test]
    async fn test_sales_summary_and_daily_series() {
        let (store, cheese, ham) = seeded_store().await;

        for (id, grams) in [(&cheese, 1_000), (&ham, 500)] {
            store
                .sales()
                .commit(&SaleRequest {
                    lines: vec![CartLine {
                        product_id: id.clone(),
                        weight_g: grams,
                    }],
                    discount_pct: 0,
                    amount_paid_cents: 100_000,
                })
                .await
                .unwrap();
        }

        // 1 kg @ $100 + 0.5 kg @ $200 = $200.00
        let summary = store.reports().sales_summary(today_window()).await.unwrap();
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.revenue_cents, 20_000);

        let series = store.reports().revenue_by_day(today_window()).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].day, Utc::now().date_naive());
        assert_eq!(series[0].revenue_cents, 20_000);
    }

    #[tokio::test]
    async fn test_empty_window_is_zeroed() {
        let (store, cheese, _) = seeded_store().await;

        store
            .sales()
            .commit(&SaleRequest {
                lines: vec![CartLine {
                    product_id: cheese,
                    weight_g: 1_000,
                }],
                discount_pct: 0,
                amount_paid_cents: 100_000,
            })
            .await
            .unwrap();

        let past = Utc::now().date_naive() - Days::new(30);
        let window = ReportWindow {
            start: past - Days::new(7),
            end: past,
        };

        let summary = store.reports().sales_summary(window).await.unwrap();
        assert_eq!(
            summary,
            SalesSummary {
                sale_count: 0,
                revenue_cents: 0,
            }
        );
        assert!(store.reports().revenue_by_day(window).await.unwrap().is_empty());
        assert_eq!(
            store
                .reports()
                .adjustment_summary(window, &ReportFilters::default())
                .await
                .unwrap(),
            AdjustmentSummary {
                added_g: 0,
                removed_g: 0,
                sold_g: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_top_products_ranked_by_weight() {
        let (store, cheese, ham) = seeded_store().await;

        store
            .sales()
            .commit(&SaleRequest {
                lines: vec![
                    CartLine {
                        product_id: cheese.clone(),
                        weight_g: 3_000,
                    },
                    CartLine {
                        product_id: ham.clone(),
                        weight_g: 1_000,
                    },
                ],
                discount_pct: 0,
                amount_paid_cents: 100_000,
            })
            .await
            .unwrap();

        let top = store
            .reports()
            .top_products(today_window(), &ReportFilters::default(), 10)
            .await
            .unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, cheese);
        assert_eq!(top[0].weight_sold_g, 3_000);
        assert_eq!(top[0].name, "Asiago");
        assert_eq!(top[1].weight_sold_g, 1_000);

        let only_ham = store
            .reports()
            .top_products(
                today_window(),
                &ReportFilters {
                    product_id: Some(ham.clone()),
                    ..Default::default()
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(only_ham.len(), 1);
        assert_eq!(only_ham[0].product_id, ham);
    }

    #[tokio::test]
    async fn test_adjustment_summary_splits_reasons() {
        let (store, cheese, _) = seeded_store().await;

        store
            .ledger()
            .adjust(&AdjustStockRequest {
                product_id: cheese.clone(),
                reason: AdjustmentReason::Add,
                delta_g: 1_000,
                notes: None,
            })
            .await
            .unwrap();
        store
            .ledger()
            .adjust(&AdjustStockRequest {
                product_id: cheese.clone(),
                reason: AdjustmentReason::Remove,
                delta_g: -250,
                notes: Some("spoilage".to_string()),
            })
            .await
            .unwrap();
        store
            .sales()
            .commit(&SaleRequest {
                lines: vec![CartLine {
                    product_id: cheese.clone(),
                    weight_g: 500,
                }],
                discount_pct: 0,
                amount_paid_cents: 100_000,
            })
            .await
            .unwrap();

        // opening balances (4 000 + 2 000) count as additions
        let summary = store
            .reports()
            .adjustment_summary(today_window(), &ReportFilters::default())
            .await
            .unwrap();
        assert_eq!(summary.added_g, 7_000);
        assert_eq!(summary.removed_g, 250);
        assert_eq!(summary.sold_g, 500);

        let removals_only = store
            .reports()
            .adjustment_summary(
                today_window(),
                &ReportFilters {
                    reason: Some(AdjustmentReason::Remove),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(removals_only.added_g, 0);
        assert_eq!(removals_only.removed_g, 250);
        assert_eq!(removals_only.sold_g, 0);
    }

    #[tokio::test]
    async fn test_inventory_snapshot() {
        let (store, cheese, _) = seeded_store().await;

        // drive cheese to low stock (800 <= 1 000 alert)
        store
            .ledger()
            .adjust(&AdjustStockRequest {
                product_id: cheese.clone(),
                reason: AdjustmentReason::Remove,
                delta_g: -3_200,
                notes: None,
            })
            .await
            .unwrap();

        let snapshot = store
            .reports()
            .inventory_snapshot(&ReportFilters::default())
            .await
            .unwrap();

        assert_eq!(snapshot.low_stock_count, 1);
        assert_eq!(snapshot.out_of_stock_count, 0);
        // 800 g @ $100/kg + 2 000 g @ $200/kg = $80 + $400
        assert_eq!(snapshot.valuation_cents, 48_000);
    }
}
