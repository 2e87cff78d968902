//! # Error Types
//!
//! Domain error types for fresco-core.
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, not manual impls
//! 2. Errors carry context (product id, available vs requested grams)
//! 3. Errors are enum variants, never strings
//! 4. Validation reports **every** violated rule, not just the first, so
//!    the caller can show a complete correction list

use thiserror::Error;

// =============================================================================
// Violation
// =============================================================================

/// A single violated business rule.
///
/// Violations are collected, not short-circuited: validating a cart with an
/// out-of-range discount and an over-stock line reports both.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Field value is invalid for a stated reason.
    #[error("{field} is invalid: {reason}")]
    Invalid { field: String, reason: String },

    /// Cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Cart has more than the allowed number of lines.
    #[error("cart cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// A cart line requests zero or negative weight.
    #[error("line for product {product_id} must have positive weight")]
    NonPositiveWeight { product_id: String },

    /// A cart line exceeds the single-line weight cap.
    #[error("line for product {product_id} exceeds {max_g} g")]
    LineTooHeavy { product_id: String, max_g: i64 },

    /// Cart references a product absent from the provided snapshot.
    #[error("unknown product {product_id}")]
    UnknownProduct { product_id: String },

    /// Advisory stock check against the snapshot failed. The authoritative
    /// check happens again at commit, against the live ledger.
    #[error("product {product_id}: requested {requested_g} g, snapshot shows {available_g} g")]
    ExceedsAvailable {
        product_id: String,
        available_g: i64,
        requested_g: i64,
    },

    /// Discount must be a whole percentage from 0 to 100.
    #[error("discount {discount_pct}% is outside 0-100")]
    DiscountOutOfRange { discount_pct: i64 },

    /// A positive subtotal must keep a strictly positive total.
    #[error("total rounds to zero while subtotal is positive")]
    ZeroTotal,

    /// Payment does not cover the total.
    #[error("amount paid {paid_cents} does not cover total {total_cents}")]
    InsufficientPayment { total_cents: i64, paid_cents: i64 },
}

/// Joins violations into one human-readable line for error messages.
pub fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Authoritative stock check failed.
    ///
    /// Always carries the current true balance so the caller can
    /// re-validate and surface real numbers, never a stale snapshot.
    #[error("insufficient stock for {product_id}: available {available_g} g, requested {requested_g} g")]
    InsufficientStock {
        product_id: String,
        available_g: i64,
        requested_g: i64,
    },

    /// One or more business rules were violated. Contains every violation.
    #[error("validation failed: {}", join_violations(violations))]
    Validation { violations: Vec<Violation> },
}

impl CoreError {
    /// Wraps a non-empty violation list.
    pub fn validation(violations: Vec<Violation>) -> Self {
        CoreError::Validation { violations }
    }
}

impl From<Vec<Violation>> for CoreError {
    fn from(violations: Vec<Violation>) -> Self {
        CoreError::Validation { violations }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p1".to_string(),
            available_g: 300,
            requested_g: 500,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for p1: available 300 g, requested 500 g"
        );
    }

    #[test]
    fn test_validation_reports_all_violations() {
        let err = CoreError::validation(vec![
            Violation::EmptyCart,
            Violation::DiscountOutOfRange { discount_pct: 120 },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("cart is empty"));
        assert!(msg.contains("120%"));
    }

    #[test]
    fn test_violation_serde_tags_rule() {
        let v = Violation::InsufficientPayment {
            total_cents: 54_000,
            paid_cents: 50_000,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["rule"], "insufficient_payment");
        assert_eq!(json["total_cents"], 54_000);
    }
}
