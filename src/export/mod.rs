//! Export module for cashflow-cli
//!
//! Writes cash flow reports in machine-readable formats:
//! - JSON: versioned envelope around the report
//! - YAML: the same envelope with a comment header
//!
//! CSV output lives on [`CashFlowReport::export_csv`](crate::reports::CashFlowReport::export_csv).

pub mod json;
pub mod yaml;

pub use json::{export_report_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_report_yaml;
