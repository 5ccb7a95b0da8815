//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod dues;
pub mod report;
pub mod service;

pub use dues::{handle_dues_command, DuesArgs};
pub use report::{handle_report_command, handle_years_command, ExportFormat, ReportArgs};
pub use service::{handle_service_command, ServiceArgs, ServiceCommands};

use chrono::NaiveDate;

use crate::error::{CashflowError, CashflowResult};
use crate::services::dues::DueKind;

/// Parse a `YYYY-MM-DD` date argument
pub(crate) fn parse_date(s: &str) -> CashflowResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        CashflowError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD", s))
    })
}

/// Parse a leg name argument; `revshare` names the revenue share
pub(crate) fn parse_leg(s: &str) -> CashflowResult<DueKind> {
    DueKind::parse(s).ok_or_else(|| {
        CashflowError::Validation(format!(
            "Invalid leg: '{}'. Use gspr, commission, cosp or revshare",
            s
        ))
    })
}
