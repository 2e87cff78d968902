//! # Repository Module
//!
//! Database repositories for Fresco POS. Each repository wraps the shared
//! pool behind a focused API; SQL lives here and nowhere else.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - catalog CRUD, read views, status refresh
//! - [`category::CategoryRepository`] - category management
//! - [`ledger::LedgerRepository`] - atomic stock adjustments and history
//! - [`sale::SaleRepository`] - all-or-nothing sale commits
//! - [`report::ReportRepository`] - read-only rollups over committed history

pub mod category;
pub mod ledger;
pub mod product;
pub mod report;
pub mod sale;
