//! # Domain Types
//!
//! Core domain types used throughout Fresco POS.
//!
//! ## Ownership
//! - The **ledger** (fresco-db) exclusively owns a product's `weight_g`
//!   balance and its `StockAdjustment` history.
//! - The **catalog** owns the descriptive attributes on `Product`.
//! - `Sale` / `SaleItem` are immutable once committed; corrections are new
//!   compensating adjustments, never edits.
//!
//! ## Dual-Key Identity Pattern
//! Entities carry an immutable UUID `id` for relations plus a
//! human-readable business key where one exists (`receipt_no` on sales,
//! the unique `name` on categories).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::expiry::FreshnessStatus;
use crate::money::Money;
use crate::weight::Weight;

// =============================================================================
// Category
// =============================================================================

/// A product category (e.g. "Cheese", "Cured Meat").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    /// Unique, non-empty display name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product sold by weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on receipts and alerts.
    pub name: String,

    /// Optional category reference.
    pub category_id: Option<String>,

    /// Supplier name (free text).
    pub supplier: String,

    /// Price per kilogram, in cents. Always > 0.
    pub price_cents: i64,

    /// Quantity on hand, in grams. Owned by the ledger; always >= 0.
    pub weight_g: i64,

    /// Low-stock alert threshold, in grams. Always > 0.
    pub stock_alert_g: i64,

    /// Expiry date. Required - a perishable shop has no undated stock.
    pub expiry_date: NaiveDate,

    /// Cached lifecycle status. A projection of `expiry_date`, refreshed on
    /// read or by the catalog's recompute pass; never hand-set.
    pub status: FreshnessStatus,

    /// Soft-delete flag. Deleted products keep their weight and history.
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price per kilogram as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Current balance as Weight.
    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_grams(self.weight_g)
    }

    /// Low-stock threshold as Weight.
    #[inline]
    pub fn stock_alert(&self) -> Weight {
        Weight::from_grams(self.stock_alert_g)
    }
}

// =============================================================================
// Product View
// =============================================================================

/// A catalog read view: product attributes composed with the live ledger
/// balance and a freshly computed status.
///
/// Views are snapshots. They may be stale by the time they are displayed;
/// the ledger re-checks every decrement at commit time regardless of what
/// any view claimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub supplier: String,
    pub price_cents: i64,
    /// Live balance at snapshot time, in grams.
    pub weight_g: i64,
    pub stock_alert_g: i64,
    pub expiry_date: NaiveDate,
    /// Status computed at read time (not the cached column).
    pub status: FreshnessStatus,
    pub is_deleted: bool,
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// Why a stock adjustment happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentReason {
    /// Goods received or a compensating correction.
    Add,
    /// Spoilage, shrinkage, manual removal.
    Remove,
    /// Decrement committed by a sale.
    Sale,
}

/// One entry in a product's append-only adjustment history.
///
/// Invariant: for any product, the sum of `delta_g` over its adjustments,
/// replayed from zero, equals its current `weight_g`. A divergence is a
/// consistency bug, not a data-entry problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: String,
    pub product_id: String,
    pub reason: AdjustmentReason,
    /// Signed grams: positive for additions, negative for removals/sales.
    pub delta_g: i64,
    pub notes: Option<String>,
    /// Immutable, set at creation.
    pub created_at: DateTime<Utc>,
}

impl StockAdjustment {
    /// The delta as Weight.
    #[inline]
    pub fn delta(&self) -> Weight {
        Weight::from_grams(self.delta_g)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Human-readable receipt number, unique, format `YYYYMMDD-NNNN`.
    pub receipt_no: String,
    pub subtotal_cents: i64,
    /// Whole-percent discount, 0-100.
    pub discount_pct: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    /// Derived: `amount_paid - total`, always >= 0 for a committed sale.
    pub change_cents: i64,
    /// Immutable, set at commit.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a committed sale.
///
/// Uses the snapshot pattern: the product's name and per-kg price are
/// frozen at sale time so later catalog edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Price per kilogram at time of sale (frozen).
    pub price_per_kg_cents: i64,
    /// Weight sold, in grams. Always > 0.
    pub weight_g: i64,
    /// Line total in cents, rounded once at commit.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn price_per_kg(&self) -> Money {
        Money::from_cents(self.price_per_kg_cents)
    }

    #[inline]
    pub fn weight(&self) -> Weight {
        Weight::from_grams(self.weight_g)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accessors() {
        let product = Product {
            id: "p1".to_string(),
            name: "Manchego".to_string(),
            category_id: None,
            supplier: "Finca Roja".to_string(),
            price_cents: 15_000,
            weight_g: 2500,
            stock_alert_g: 1000,
            expiry_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status: FreshnessStatus::Fresh,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(product.price().cents(), 15_000);
        assert_eq!(product.weight().grams(), 2500);
        assert_eq!(product.stock_alert().grams(), 1000);
    }

    #[test]
    fn test_adjustment_reason_serde() {
        let json = serde_json::to_string(&AdjustmentReason::Sale).unwrap();
        assert_eq!(json, "\"sale\"");
    }
}
