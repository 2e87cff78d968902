//! # Cart Validation & Totals
//!
//! The pure half of the sale transaction engine: validates a cart against a
//! catalog snapshot and computes totals at full precision.
//!
//! ## Precision
//! Prices are cents per kilogram and weights are grams, so a line total
//! lives naturally in *cent-gram* space (`price_cents x weight_g`). The
//! subtotal and discount are computed there with i128 intermediates and
//! divided down to cents exactly once, at the end. Rounding never compounds
//! across subtotal -> discount -> total -> change.
//!
//! ## Advisory vs authoritative
//! The stock check here compares against a snapshot the caller fetched
//! earlier, which may be stale. It exists to reject obviously bad carts
//! early with a complete violation list. The authoritative check is the
//! ledger's, at commit time, inside the transaction.

use serde::{Deserialize, Serialize};

use crate::error::Violation;
use crate::{MAX_CART_LINES, MAX_LINE_WEIGHT_G};

// =============================================================================
// Inputs
// =============================================================================

/// One requested cart line: a product and how much of it, in grams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub weight_g: i64,
}

/// Catalog-reported state of one product at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub product_id: String,
    /// Price per kilogram in cents, as the catalog reported it.
    pub price_cents: i64,
    /// Balance in grams, as the catalog reported it. May be stale.
    pub available_g: i64,
}

// =============================================================================
// Outputs
// =============================================================================

/// A cart line priced from the snapshot, with its rounded line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: String,
    pub weight_g: i64,
    /// Per-kg price frozen from the snapshot.
    pub price_per_kg_cents: i64,
    pub line_total_cents: i64,
}

/// Validated cart totals, all in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub lines: Vec<PricedLine>,
    pub subtotal_cents: i64,
    pub discount_pct: i64,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
}

// =============================================================================
// Validation
// =============================================================================

/// Rounds a cent-gram quantity down to cents, half up.
#[inline]
fn cent_grams_to_cents(cg: i128) -> i64 {
    ((cg + 500) / 1000) as i64
}

/// Validates a cart and computes its totals.
///
/// Checks, collecting **every** violation rather than stopping at the
/// first:
/// - cart non-empty and within the line cap
/// - each line weight positive and within the single-line cap
/// - each line's product present in the snapshot
/// - discount within 0-100
/// - advisory: requested weight within the snapshot balance
/// - a positive subtotal keeps a strictly positive total (a 100% discount
///   on a non-empty cart is rejected, not rung up as free)
/// - amount paid covers the total
///
/// Payment and zero-total checks need a computed total, so they are only
/// performed when the discount is in range and every product priced; the
/// violations that prevented pricing are reported in their place.
///
/// On success returns [`CartTotals`] with per-line price snapshots; nothing
/// is written anywhere.
pub fn validate(
    lines: &[CartLine],
    discount_pct: i64,
    amount_paid_cents: i64,
    snapshot: &[StockSnapshot],
) -> Result<CartTotals, Vec<Violation>> {
    let mut violations = Vec::new();

    if lines.is_empty() {
        violations.push(Violation::EmptyCart);
    }
    if lines.len() > MAX_CART_LINES {
        violations.push(Violation::TooManyLines { max: MAX_CART_LINES });
    }

    let discount_ok = (0..=100).contains(&discount_pct);
    if !discount_ok {
        violations.push(Violation::DiscountOutOfRange { discount_pct });
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal_cg: i128 = 0;
    let mut all_priced = true;

    for line in lines {
        if line.weight_g <= 0 {
            violations.push(Violation::NonPositiveWeight {
                product_id: line.product_id.clone(),
            });
            all_priced = false;
            continue;
        }
        if line.weight_g > MAX_LINE_WEIGHT_G {
            violations.push(Violation::LineTooHeavy {
                product_id: line.product_id.clone(),
                max_g: MAX_LINE_WEIGHT_G,
            });
        }

        let Some(snap) = snapshot.iter().find(|s| s.product_id == line.product_id) else {
            violations.push(Violation::UnknownProduct {
                product_id: line.product_id.clone(),
            });
            all_priced = false;
            continue;
        };

        if line.weight_g > snap.available_g {
            violations.push(Violation::ExceedsAvailable {
                product_id: line.product_id.clone(),
                available_g: snap.available_g,
                requested_g: line.weight_g,
            });
        }

        let line_cg = snap.price_cents as i128 * line.weight_g as i128;
        subtotal_cg += line_cg;
        priced.push(PricedLine {
            product_id: line.product_id.clone(),
            weight_g: line.weight_g,
            price_per_kg_cents: snap.price_cents,
            line_total_cents: cent_grams_to_cents(line_cg),
        });
    }

    if discount_ok && all_priced && !lines.is_empty() {
        let bps = discount_pct as i128 * 100;
        let total_cg = (subtotal_cg * (10_000 - bps) + 5_000) / 10_000;
        let subtotal_cents = cent_grams_to_cents(subtotal_cg);
        let total_cents = cent_grams_to_cents(total_cg);

        if subtotal_cg > 0 && total_cents == 0 {
            violations.push(Violation::ZeroTotal);
        }
        if amount_paid_cents < total_cents {
            violations.push(Violation::InsufficientPayment {
                total_cents,
                paid_cents: amount_paid_cents,
            });
        }

        if violations.is_empty() {
            return Ok(CartTotals {
                lines: priced,
                subtotal_cents,
                discount_pct,
                total_cents,
                amount_paid_cents,
                change_cents: amount_paid_cents - total_cents,
            });
        }
    }

    Err(violations)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<StockSnapshot> {
        vec![
            StockSnapshot {
                product_id: "cheese".to_string(),
                price_cents: 15_000, // $150.00 / kg
                available_g: 5_000,
            },
            StockSnapshot {
                product_id: "ham".to_string(),
                price_cents: 20_000, // $200.00 / kg
                available_g: 3_000,
            },
        ]
    }

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine {
                product_id: "cheese".to_string(),
                weight_g: 2_000, // 2.00 kg
            },
            CartLine {
                product_id: "ham".to_string(),
                weight_g: 1_500, // 1.50 kg
            },
        ]
    }

    #[test]
    fn test_monetary_reconciliation() {
        // 2.00 kg @ $150 + 1.50 kg @ $200 = $600.00; 10% off = $540.00
        let totals = validate(&cart(), 10, 60_000, &snapshot()).unwrap();

        assert_eq!(totals.subtotal_cents, 60_000);
        assert_eq!(totals.total_cents, 54_000);
        assert_eq!(totals.change_cents, 6_000);
        assert_eq!(totals.lines[0].line_total_cents, 30_000);
        assert_eq!(totals.lines[1].line_total_cents, 30_000);
    }

    #[test]
    fn test_insufficient_payment_rejected() {
        let err = validate(&cart(), 10, 50_000, &snapshot()).unwrap_err();
        assert_eq!(
            err,
            vec![Violation::InsufficientPayment {
                total_cents: 54_000,
                paid_cents: 50_000,
            }]
        );
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let totals = validate(&cart(), 10, 54_000, &snapshot()).unwrap();
        assert_eq!(totals.change_cents, 0);
    }

    #[test]
    fn test_empty_cart() {
        let err = validate(&[], 0, 0, &snapshot()).unwrap_err();
        assert!(err.contains(&Violation::EmptyCart));
    }

    #[test]
    fn test_collects_all_violations() {
        let lines = vec![
            CartLine {
                product_id: "cheese".to_string(),
                weight_g: 0, // non-positive
            },
            CartLine {
                product_id: "olives".to_string(), // unknown
                weight_g: 500,
            },
        ];
        let err = validate(&lines, 150, 0, &snapshot()).unwrap_err();

        assert!(err.contains(&Violation::NonPositiveWeight {
            product_id: "cheese".to_string()
        }));
        assert!(err.contains(&Violation::UnknownProduct {
            product_id: "olives".to_string()
        }));
        assert!(err.contains(&Violation::DiscountOutOfRange { discount_pct: 150 }));
        assert_eq!(err.len(), 3);
    }

    #[test]
    fn test_advisory_stock_check() {
        let lines = vec![CartLine {
            product_id: "ham".to_string(),
            weight_g: 4_000, // snapshot shows 3 000 g
        }];
        let err = validate(&lines, 0, 1_000_000, &snapshot()).unwrap_err();
        assert_eq!(
            err,
            vec![Violation::ExceedsAvailable {
                product_id: "ham".to_string(),
                available_g: 3_000,
                requested_g: 4_000,
            }]
        );
    }

    #[test]
    fn test_full_discount_rejected_not_free() {
        let err = validate(&cart(), 100, 0, &snapshot()).unwrap_err();
        assert!(err.contains(&Violation::ZeroTotal));
    }

    #[test]
    fn test_fractional_grams_round_once() {
        // 0.333 kg @ $9.99/kg = 332.667 cents exact -> 333 cents
        let snapshot = vec![StockSnapshot {
            product_id: "feta".to_string(),
            price_cents: 999,
            available_g: 1_000,
        }];
        let lines = vec![CartLine {
            product_id: "feta".to_string(),
            weight_g: 333,
        }];

        let totals = validate(&lines, 0, 400, &snapshot).unwrap();
        assert_eq!(totals.subtotal_cents, 333);
        assert_eq!(totals.total_cents, 333);
        assert_eq!(totals.change_cents, 67);
    }
}
