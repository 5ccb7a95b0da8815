//! JSON Export functionality
//!
//! Exports a cash flow report to JSON with schema versioning.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::error::{CashflowError, CashflowResult};
use crate::reports::CashFlowReport;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Report export envelope
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a> {
    /// Schema version for compatibility checking
    pub schema_version: &'static str,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: &'static str,

    pub report: &'a CashFlowReport,
}

impl<'a> ReportExport<'a> {
    pub fn new(report: &'a CashFlowReport) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            report,
        }
    }
}

/// Export a report to JSON
pub fn export_report_json<W: Write>(
    report: &CashFlowReport,
    writer: &mut W,
    pretty: bool,
) -> CashflowResult<()> {
    let export = ReportExport::new(report);

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| CashflowError::Export(e.to_string()))?;

    Ok(())
}
