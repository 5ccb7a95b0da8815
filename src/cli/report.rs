//! CLI commands for reports
//!
//! Provides the cash flow report and the list of years that have data.

use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::settings::Settings;
use crate::error::{CashflowError, CashflowResult};
use crate::export::{export_report_json, export_report_yaml};
use crate::models::Granularity;
use crate::reports::CashFlowReport;
use crate::services::aggregation::{available_years, default_year};
use crate::storage::{RecordStore, Storage};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per period plus a TOTAL row
    Csv,
    /// JSON report envelope
    Json,
    /// YAML report envelope, human-readable
    Yaml,
}

impl ExportFormat {
    /// Guess the format from a file extension, defaulting to CSV
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Csv,
        }
    }
}

/// Arguments for `cashflow report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Year to report on (defaults to the latest year with data)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Bucketing: month or week (defaults to the configured granularity)
    #[arg(short, long)]
    pub scale: Option<String>,

    /// Write the report to a file instead of the terminal
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,
}

/// Handle `cashflow report`
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    args: ReportArgs,
) -> CashflowResult<()> {
    let granularity = match args.scale.as_deref() {
        Some(s) => Granularity::parse(s).ok_or_else(|| {
            CashflowError::Validation(format!("Invalid scale: '{}'. Use month or week", s))
        })?,
        None => settings.default_granularity,
    };

    let report = CashFlowReport::generate(storage, args.year, granularity)?;

    match (args.output, args.format) {
        (Some(path), format) => {
            let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
            let file = File::create(&path).map_err(|e| {
                CashflowError::Export(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let mut writer = BufWriter::new(file);
            write_report(&report, format, &mut writer)?;
            writer.flush()?;
            println!("Cash flow report exported to: {}", path.display());
        }
        (None, Some(format)) => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            write_report(&report, format, &mut writer)?;
            if format == ExportFormat::Json {
                writeln!(writer)?;
            }
        }
        (None, None) => print!("{}", report.format_terminal()),
    }

    Ok(())
}

fn write_report<W: Write>(
    report: &CashFlowReport,
    format: ExportFormat,
    writer: &mut W,
) -> CashflowResult<()> {
    match format {
        ExportFormat::Csv => report.export_csv(writer),
        ExportFormat::Json => export_report_json(report, writer, true),
        ExportFormat::Yaml => export_report_yaml(report, writer),
    }
}

/// Handle `cashflow years`
pub fn handle_years_command(storage: &Storage) -> CashflowResult<()> {
    let records = storage.load_all()?;
    let years = available_years(&records);

    if years.is_empty() {
        println!("No dated cash flows yet.");
        return Ok(());
    }

    let default = default_year(&records);
    for year in years {
        if Some(year) == default {
            println!("{} (default)", year);
        } else {
            println!("{}", year);
        }
    }

    Ok(())
}
