//! YAML Export functionality
//!
//! Exports a cash flow report to YAML for human reading.

use std::io::Write;

use crate::error::{CashflowError, CashflowResult};
use crate::export::json::ReportExport;
use crate::reports::CashFlowReport;

/// Export a report to YAML format
pub fn export_report_yaml<W: Write>(report: &CashFlowReport, writer: &mut W) -> CashflowResult<()> {
    let export = ReportExport::new(report);

    writeln!(writer, "# cashflow-cli Cash Flow Report")
        .map_err(|e| CashflowError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| CashflowError::Export(e.to_string()))?;
    writeln!(writer, "# App Version: {}", export.app_version)
        .map_err(|e| CashflowError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| CashflowError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| CashflowError::Export(e.to_string()))?;

    Ok(())
}
