//! Cash Flow Report
//!
//! Per-period inflows, outflows and net for one year, at month or ISO week
//! granularity.

use chrono::{Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

use crate::display::format_currency;
use crate::error::CashflowResult;
use crate::events::{ChangeBus, SubscriptionId};
use crate::models::Granularity;
use crate::services::aggregation::{
    aggregate_with_diagnostics, available_years, default_year, CashFlowTotals, DiagnosticReason,
    ParseDiagnostic, PeriodBucket,
};
use crate::storage::RecordStore;

/// Period column plus six 13-wide amount columns, each preceded by a space
const TABLE_WIDTH: usize = 10 + 6 * 14;

/// Cash Flow Report
#[derive(Debug, Clone, Serialize)]
pub struct CashFlowReport {
    /// Year the buckets were filtered to
    pub year: i32,
    /// Month or week buckets
    pub granularity: Granularity,
    /// Every year that has at least one dated leg
    pub available_years: Vec<i32>,
    /// Buckets in chronological order
    pub buckets: Vec<PeriodBucket>,
    /// Sum over all buckets
    pub totals: CashFlowTotals,
    /// Amounts counted as zero because they were unreadable or overflowed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl CashFlowReport {
    /// Generate a report from the records in `store`
    ///
    /// Without an explicit year, the most recent year with data is used, or
    /// the current year when there is no data at all.
    pub fn generate(
        store: &impl RecordStore,
        year: Option<i32>,
        granularity: Granularity,
    ) -> CashflowResult<Self> {
        let records = store.load_all()?;
        let year = year
            .or_else(|| default_year(&records))
            .unwrap_or_else(|| Utc::now().year());

        let outcome = aggregate_with_diagnostics(&records, year, granularity);
        tracing::debug!(
            year,
            %granularity,
            records = records.len(),
            buckets = outcome.buckets.len(),
            "generated cash flow report"
        );

        Ok(Self {
            year,
            granularity,
            available_years: available_years(&records),
            totals: CashFlowTotals::from_buckets(&outcome.buckets),
            buckets: outcome.buckets,
            diagnostics: outcome.diagnostics,
        })
    }

    /// Regenerate the report after every change published on `bus`
    ///
    /// `on_refresh` receives each new report, or the error that stopped it.
    pub fn refresh_on_change<S, F>(
        bus: &ChangeBus,
        store: Arc<S>,
        year: Option<i32>,
        granularity: Granularity,
        on_refresh: F,
    ) -> SubscriptionId
    where
        S: RecordStore + Send + Sync + 'static,
        F: Fn(CashflowResult<CashFlowReport>) + Send + Sync + 'static,
    {
        bus.subscribe(move |_| on_refresh(Self::generate(store.as_ref(), year, granularity)))
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Cash Flow Report: {} ({})\n",
            self.year,
            self.granularity.title()
        ));
        output.push_str(&"=".repeat(TABLE_WIDTH));
        output.push('\n');

        if self.buckets.is_empty() {
            output.push_str(&format!("No cash flows due in {}.\n", self.year));
            if !self.available_years.is_empty() {
                output.push_str(&format!(
                    "Years with data: {}\n",
                    join_years(&self.available_years)
                ));
            }
            return output;
        }

        output.push_str(&format!(
            "{:<10} {:>13} {:>13} {:>13} {:>13} {:>13} {:>13}\n",
            "Period", "Inflows", "Outflows", "Net", "GSPR", "Commission", "COSP"
        ));
        output.push_str(&"-".repeat(TABLE_WIDTH));
        output.push('\n');

        for bucket in &self.buckets {
            output.push_str(&format!(
                "{:<10} {:>13} {:>13} {:>13} {:>13} {:>13} {:>13}\n",
                bucket.display,
                format_currency(bucket.inflows),
                format_currency(bucket.outflows),
                format_currency(bucket.net),
                format_currency(bucket.gspr),
                format_currency(bucket.commission),
                format_currency(bucket.cosp),
            ));
        }

        output.push_str(&"-".repeat(TABLE_WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>13} {:>13} {:>13} {:>13} {:>13} {:>13}\n",
            "TOTAL",
            format_currency(self.totals.inflows),
            format_currency(self.totals.outflows),
            format_currency(self.totals.net),
            format_currency(self.totals.gspr),
            format_currency(self.totals.commission),
            format_currency(self.totals.cosp),
        ));

        if !self.diagnostics.is_empty() {
            output.push('\n');
            output.push_str(&format!(
                "Warning: {} amount(s) were counted as $0.00\n",
                self.diagnostics.len()
            ));
            for d in &self.diagnostics {
                let why = match d.reason {
                    DiagnosticReason::Unparseable => "not a number",
                    DiagnosticReason::Overflow => "too large for the period total",
                };
                output.push_str(&format!(
                    "  {} {}: '{}' ({})\n",
                    d.record_id, d.field, d.raw, why
                ));
            }
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> CashflowResult<()> {
        let mut csv = csv::Writer::from_writer(writer);

        csv.write_record([
            "Period", "Label", "Inflows", "Outflows", "Net", "GSPR", "Commission", "COSP",
        ])?;

        for bucket in &self.buckets {
            csv.write_record([
                bucket.period_key.clone(),
                bucket.display.clone(),
                plain(bucket.inflows),
                plain(bucket.outflows),
                plain(bucket.net),
                plain(bucket.gspr),
                plain(bucket.commission),
                plain(bucket.cosp),
            ])?;
        }

        csv.write_record([
            "TOTAL".to_string(),
            String::new(),
            plain(self.totals.inflows),
            plain(self.totals.outflows),
            plain(self.totals.net),
            plain(self.totals.gspr),
            plain(self.totals.commission),
            plain(self.totals.cosp),
        ])?;

        csv.flush()?;
        Ok(())
    }
}

/// Two-decimal amount without currency symbol or grouping
fn plain(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn join_years(years: &[i32]) -> String {
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashflowPaths;
    use crate::models::ServiceRecord;
    use crate::services::{RecordService, ServiceFields};
    use crate::storage::Storage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_records() -> Vec<ServiceRecord> {
        vec![
            ServiceRecord::new()
                .with_client("Ada", "Lovelace")
                .with_gspr("1,000.00", date(2024, 1, 15))
                .with_commission("1000", "10", date(2024, 1, 20))
                .with_cosp("200", date(2024, 1, 25)),
            ServiceRecord::new()
                .with_gspr("500", date(2024, 2, 3))
                .with_cosp("50", date(2023, 12, 30)),
        ]
    }

    #[test]
    fn test_generate_defaults_to_latest_year() {
        let report = CashFlowReport::generate(&sample_records(), None, Granularity::Month).unwrap();

        assert_eq!(report.year, 2024);
        assert_eq!(report.available_years, vec![2023, 2024]);
        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.buckets[0].period_key, "2024-01");
        assert_eq!(report.buckets[0].net, dec!(900));
        assert_eq!(report.totals.inflows, dec!(1600));
        assert_eq!(report.totals.net, dec!(1400));
    }

    #[test]
    fn test_generate_from_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashflowPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load().unwrap();
        for record in sample_records() {
            storage.services.upsert(record).unwrap();
        }

        let report = CashFlowReport::generate(&storage, Some(2023), Granularity::Week).unwrap();
        assert_eq!(report.buckets.len(), 1);
        assert_eq!(report.buckets[0].period_key, "2023-W52");
        assert_eq!(report.totals.outflows, dec!(50));
    }

    #[test]
    fn test_refresh_on_change() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashflowPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load().unwrap();
        let storage = Arc::new(storage);

        let bus = ChangeBus::new();
        let nets = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&nets);
        let subscription = CashFlowReport::refresh_on_change(
            &bus,
            Arc::clone(&storage),
            Some(2024),
            Granularity::Month,
            move |report| sink.lock().unwrap().push(report.unwrap().totals.net),
        );

        let service = RecordService::new(&storage, &bus);
        let record = service
            .create(ServiceFields {
                gross_sales_price_receivable: Some("500".into()),
                gspr_due_date: Some(date(2024, 4, 2)),
                ..Default::default()
            })
            .unwrap();
        service
            .update(
                record.id,
                ServiceFields {
                    cost_of_sales_payable: Some("120".into()),
                    cosp_due_date: Some(date(2024, 4, 9)),
                    ..Default::default()
                },
            )
            .unwrap();
        service.delete(record.id).unwrap();

        assert_eq!(*nets.lock().unwrap(), vec![dec!(500), dec!(380), dec!(0)]);

        assert!(bus.unsubscribe(subscription));
        service
            .create(ServiceFields {
                client_first_name: Some("Ada".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(nets.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_format_terminal() {
        let report = CashFlowReport::generate(&sample_records(), None, Granularity::Month).unwrap();
        let output = report.format_terminal();

        assert!(output.contains("Cash Flow Report: 2024"));
        assert!(output.contains("Jan 2024"));
        assert!(output.contains("$900.00"));
        assert!(output.contains("TOTAL"));
        assert!(!output.contains("Warning"));
    }

    #[test]
    fn test_format_terminal_columns() {
        let records = vec![ServiceRecord::new().with_cosp("75", date(2024, 8, 2))];
        let report = CashFlowReport::generate(&records, None, Granularity::Month).unwrap();
        let output = report.format_terminal();
        let lines: Vec<_> = output.lines().collect();

        let header: Vec<_> = lines[2].split_whitespace().collect();
        assert_eq!(
            header,
            vec!["Period", "Inflows", "Outflows", "Net", "GSPR", "Commission", "COSP"]
        );
        assert_eq!(lines[1].len(), lines[2].len());
        assert_eq!(lines[3].len(), lines[2].len());

        let row: Vec<_> = lines[4].split_whitespace().collect();
        assert_eq!(
            row,
            vec!["Aug", "2024", "$0.00", "$75.00", "-$75.00", "$0.00", "$0.00", "$75.00"]
        );
        let total: Vec<_> = lines[6].split_whitespace().collect();
        assert_eq!(total.len(), 7);
        assert_eq!(total[0], "TOTAL");
        assert_eq!(total[6], "$75.00");
    }

    #[test]
    fn test_overflow_reported() {
        let largest = "79228162514264337593543950335";
        let records = vec![
            ServiceRecord::new().with_gspr(largest, date(2024, 1, 1)),
            ServiceRecord::new().with_gspr(largest, date(2024, 1, 9)),
        ];
        let report = CashFlowReport::generate(&records, Some(2024), Granularity::Month).unwrap();

        assert_eq!(report.totals.gspr, Decimal::MAX);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report
            .format_terminal()
            .contains("too large for the period total"));
    }

    #[test]
    fn test_format_terminal_empty_year() {
        let report =
            CashFlowReport::generate(&sample_records(), Some(2030), Granularity::Month).unwrap();
        let output = report.format_terminal();

        assert!(output.contains("No cash flows due in 2030."));
        assert!(output.contains("Years with data: 2023, 2024"));
    }

    #[test]
    fn test_malformed_amount_reported() {
        let records = vec![ServiceRecord::new().with_gspr("abc", date(2024, 5, 1))];
        let report = CashFlowReport::generate(&records, Some(2024), Granularity::Month).unwrap();

        assert_eq!(report.buckets[0].gspr, Decimal::ZERO);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.format_terminal().contains("'abc'"));
    }

    #[test]
    fn test_export_csv() {
        let report = CashFlowReport::generate(&sample_records(), None, Granularity::Month).unwrap();

        let mut csv_output = Vec::new();
        report.export_csv(&mut csv_output).unwrap();
        let csv_string = String::from_utf8(csv_output).unwrap();

        let lines: Vec<_> = csv_string.lines().collect();
        assert_eq!(
            lines[0],
            "Period,Label,Inflows,Outflows,Net,GSPR,Commission,COSP"
        );
        assert_eq!(
            lines[1],
            "2024-01,Jan 2024,1100.00,200.00,900.00,1000.00,100.00,200.00"
        );
        assert!(lines[3].starts_with("TOTAL,,1600.00"));
    }
}
