//! cashflow-cli - Terminal cash-flow tracker for service receivables and payables
//!
//! Each service record carries up to three dated legs: the gross sales price
//! receivable (GSPR), the commission receivable, and the cost of sales payable
//! (COSP). The aggregation core groups those legs into month (`2024-01`) or
//! ISO week (`2025-W01`) buckets for one selected year and computes inflows,
//! outflows and net per bucket.
//!
//! # Architecture
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Service records, periods, amounts and IDs
//! - `storage`: JSON file storage and the `RecordStore` read seam
//! - `events`: Change notifications published after every mutation
//! - `services`: Record management, aggregation and dues
//! - `reports`: The cash flow report
//! - `display` / `export`: Terminal, CSV, JSON and YAML output
//! - `cli`: Command handlers for the `cashflow` binary
//!
//! # Example
//!
//! ```rust
//! use cashflow::models::{Granularity, ServiceRecord};
//! use cashflow::services::aggregate;
//! use chrono::NaiveDate;
//!
//! let records = vec![ServiceRecord::new()
//!     .with_gspr("1,000.00", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())];
//! let buckets = aggregate(&records, 2024, Granularity::Month);
//! assert_eq!(buckets[0].period_key, "2024-01");
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CashflowError, CashflowResult};
