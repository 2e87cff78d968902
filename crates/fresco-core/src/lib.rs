//! # fresco-core: Pure Business Logic for Fresco POS
//!
//! This crate is the heart of Fresco POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! Fresco is a point-of-sale and inventory engine for a perishable-goods
//! shop. Everything here operates on exact integer units: money in cents,
//! weight in grams.
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, StockAdjustment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`weight`] - Weight type in integer grams (goods are sold by weight)
//! - [`expiry`] - Pure expiry-date classification (fresh/expiring/expired)
//! - [`cart`] - Cart validation and full-precision totals
//! - [`catalog`] - Pure filters over product snapshots (low stock, etc.)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Units**: Monetary values are cents (i64), weights are grams (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

pub mod cart;
pub mod catalog;
pub mod error;
pub mod expiry;
pub mod money;
pub mod types;
pub mod weight;

pub use cart::{CartLine, CartTotals, StockSnapshot};
pub use error::{CoreError, CoreResult, Violation};
pub use expiry::{classify, FreshnessStatus};
pub use money::Money;
pub use types::*;
pub use weight::Weight;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default number of days before expiry during which a product counts as
/// "expiring". Products past their date are "expired" regardless.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 7;

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps a transaction a reasonable size.
pub const MAX_CART_LINES: usize = 100;

/// Maximum weight of a single cart line, in grams (500 kg).
///
/// Guards against fat-finger entries (typing 1000 kg instead of 1.000 kg).
pub const MAX_LINE_WEIGHT_G: i64 = 500_000;
