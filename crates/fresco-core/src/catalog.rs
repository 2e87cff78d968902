//! # Catalog Filters
//!
//! Pure filters over [`ProductView`] snapshots, feeding the alert banners.
//!
//! These operate on a snapshot the caller already fetched; the result may
//! be stale by the time it is displayed. That is fine for read-only
//! alerting - the ledger re-checks everything that actually moves stock.

use crate::expiry::FreshnessStatus;
use crate::types::ProductView;

/// Products with some stock left but at or under their alert threshold
/// (`0 < weight <= stock_alert`).
pub fn low_stock(views: &[ProductView]) -> Vec<&ProductView> {
    views
        .iter()
        .filter(|v| v.weight_g > 0 && v.weight_g <= v.stock_alert_g)
        .collect()
}

/// Products with nothing on hand (`weight == 0`).
pub fn out_of_stock(views: &[ProductView]) -> Vec<&ProductView> {
    views.iter().filter(|v| v.weight_g == 0).collect()
}

/// Products whose computed status is `Expiring`.
pub fn expiring_soon(views: &[ProductView]) -> Vec<&ProductView> {
    views
        .iter()
        .filter(|v| v.status == FreshnessStatus::Expiring)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn view(id: &str, weight_g: i64, alert_g: i64, status: FreshnessStatus) -> ProductView {
        ProductView {
            id: id.to_string(),
            name: id.to_string(),
            category_id: None,
            supplier: "test".to_string(),
            price_cents: 1000,
            weight_g,
            stock_alert_g: alert_g,
            expiry_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status,
            is_deleted: false,
        }
    }

    #[test]
    fn test_low_stock_excludes_empty_and_healthy() {
        let views = vec![
            view("low", 500, 1000, FreshnessStatus::Fresh),
            view("empty", 0, 1000, FreshnessStatus::Fresh),
            view("healthy", 5000, 1000, FreshnessStatus::Fresh),
            view("boundary", 1000, 1000, FreshnessStatus::Fresh),
        ];

        let low: Vec<_> = low_stock(&views).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(low, vec!["low", "boundary"]);
    }

    #[test]
    fn test_out_of_stock() {
        let views = vec![
            view("empty", 0, 1000, FreshnessStatus::Fresh),
            view("stocked", 100, 1000, FreshnessStatus::Fresh),
        ];
        assert_eq!(out_of_stock(&views).len(), 1);
        assert_eq!(out_of_stock(&views)[0].id, "empty");
    }

    #[test]
    fn test_expiring_soon() {
        let views = vec![
            view("a", 100, 1000, FreshnessStatus::Expiring),
            view("b", 100, 1000, FreshnessStatus::Fresh),
            view("c", 100, 1000, FreshnessStatus::Expired),
        ];
        assert_eq!(expiring_soon(&views).len(), 1);
        assert_eq!(expiring_soon(&views)[0].id, "a");
    }
}
