//! # fresco-db: Database Layer for Fresco POS
//!
//! Persistence for the Fresco inventory and sale engine, built on SQLite
//! with sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the [`Store`] handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog, ledger, sale and report repositories
//!
//! ## The one rule that matters
//!
//! A product's `weight_g` is owned by the stock ledger. Every change to it
//! happens inside a transaction that simultaneously appends a
//! `stock_adjustments` row, so the replayed adjustment history always
//! equals the live balance. Nothing else in this crate (or outside it)
//! writes that column.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fresco_db::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("fresco.db")).await?;
//!
//! let views = store.products().list(false).await?;
//! let receipt = store.sales().commit(&sale_request).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

pub use repository::category::CategoryRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
