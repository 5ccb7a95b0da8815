//! Reports module for cashflow-cli
//!
//! Provides the per-period cash flow report with terminal and CSV output.

pub mod cash_flow;

pub use cash_flow::CashFlowReport;
