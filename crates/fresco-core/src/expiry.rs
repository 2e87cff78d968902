//! # Expiry Classification
//!
//! Pure mapping from a product's expiry date to its lifecycle status.
//!
//! The status stored on a product row is only a cache of this function's
//! output; it is refreshed on read or by the catalog's recompute pass and
//! is never hand-set by callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DEFAULT_EXPIRY_WARNING_DAYS;

/// Lifecycle status of a perishable product, derived from its expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    /// Expiry date is beyond the warning window.
    Fresh,
    /// Expiry date falls within the warning window (today counts).
    Expiring,
    /// Expiry date has passed.
    Expired,
}

impl fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessStatus::Fresh => write!(f, "fresh"),
            FreshnessStatus::Expiring => write!(f, "expiring"),
            FreshnessStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Classifies an expiry date relative to `today`.
///
/// ## Rule
/// - `Expired` if `expiry_date < today`
/// - `Expiring` if `0 <= days_until_expiry <= warning_window_days`
/// - `Fresh` otherwise
///
/// Pure and deterministic; there are no error cases. The expiry date is
/// required on every product, so an absent date is the caller's problem.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use fresco_core::expiry::{classify, FreshnessStatus};
///
/// let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
/// let soon = today + chrono::Days::new(3);
/// assert_eq!(classify(soon, today, 7), FreshnessStatus::Expiring);
/// ```
pub fn classify(expiry_date: NaiveDate, today: NaiveDate, warning_window_days: i64) -> FreshnessStatus {
    let days_until = (expiry_date - today).num_days();

    if days_until < 0 {
        FreshnessStatus::Expired
    } else if days_until <= warning_window_days {
        FreshnessStatus::Expiring
    } else {
        FreshnessStatus::Fresh
    }
}

/// [`classify`] with the default 7-day warning window.
#[inline]
pub fn classify_default(expiry_date: NaiveDate, today: NaiveDate) -> FreshnessStatus {
    classify(expiry_date, today, DEFAULT_EXPIRY_WARNING_DAYS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    #[test]
    fn test_fresh_beyond_window() {
        let expiry = today() + Days::new(30);
        assert_eq!(classify(expiry, today(), 7), FreshnessStatus::Fresh);
    }

    #[test]
    fn test_expiring_within_window() {
        let expiry = today() + Days::new(3);
        assert_eq!(classify(expiry, today(), 7), FreshnessStatus::Expiring);
    }

    #[test]
    fn test_expiring_on_window_boundary() {
        let expiry = today() + Days::new(7);
        assert_eq!(classify(expiry, today(), 7), FreshnessStatus::Expiring);

        let expiry = today() + Days::new(8);
        assert_eq!(classify(expiry, today(), 7), FreshnessStatus::Fresh);
    }

    #[test]
    fn test_expires_today_is_expiring_not_expired() {
        assert_eq!(classify(today(), today(), 7), FreshnessStatus::Expiring);
    }

    #[test]
    fn test_expired_yesterday() {
        let expiry = today() - Days::new(1);
        assert_eq!(classify(expiry, today(), 7), FreshnessStatus::Expired);
    }

    #[test]
    fn test_deterministic() {
        let expiry = today() + Days::new(5);
        assert_eq!(classify(expiry, today(), 7), classify(expiry, today(), 7));
    }

    #[test]
    fn test_default_window() {
        let expiry = today() + Days::new(7);
        assert_eq!(classify_default(expiry, today()), FreshnessStatus::Expiring);
    }
}
