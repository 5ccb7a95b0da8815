//! CLI command for outstanding dues
//!
//! Lists receivables and payables that have not been cleared yet.

use clap::Args;

use super::parse_date;
use crate::config::settings::Settings;
use crate::display::format_due_list;
use crate::error::{CashflowError, CashflowResult};
use crate::models::Period;
use crate::services::dues::{outstanding, DueFilter, DueKind};
use crate::storage::{RecordStore, Storage};

/// Arguments for `cashflow dues`
#[derive(Args, Debug, Default)]
pub struct DuesArgs {
    /// Only one kind: receivable, commission, payable or revshare
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Only items due on or before this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub until: Option<String>,

    /// Only items due within a month or week (e.g. 2024-03 or 2024-W10)
    #[arg(short, long)]
    pub period: Option<String>,
}

impl DuesArgs {
    fn into_filter(self) -> CashflowResult<DueFilter> {
        let kind = self
            .kind
            .as_deref()
            .map(|s| {
                DueKind::parse(s).ok_or_else(|| {
                    CashflowError::Validation(format!(
                        "Invalid kind: '{}'. Use receivable, commission, payable or revshare",
                        s
                    ))
                })
            })
            .transpose()?;

        let period = self
            .period
            .as_deref()
            .map(|s| {
                Period::parse(s).map_err(|e| {
                    CashflowError::Validation(format!("Invalid period '{}': {}", s, e))
                })
            })
            .transpose()?;

        Ok(DueFilter {
            kind,
            until: self.until.as_deref().map(parse_date).transpose()?,
            period,
        })
    }
}

/// Handle `cashflow dues`
pub fn handle_dues_command(
    storage: &Storage,
    settings: &Settings,
    args: DuesArgs,
) -> CashflowResult<()> {
    let filter = args.into_filter()?;
    let records = storage.load_all()?;
    let items = outstanding(&records, &filter);

    print!("{}", format_due_list(&items, &settings.date_format));
    if !items.is_empty() {
        println!();
    }
    Ok(())
}
