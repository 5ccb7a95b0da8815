//! Period bucketing of cash-flow legs
//!
//! Every dated leg of every record lands in the month or ISO week containing
//! its due date. Legs whose period year differs from the selected year are
//! dropped. Each call rebuilds all buckets from the records it is given; there
//! is no cached or incremental state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    period_info, try_parse_amount, Granularity, LegKind, PeriodInfo, ServiceId, ServiceRecord,
};

/// Totals for one month or ISO week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBucket {
    /// `YYYY-MM` or `YYYY-W##`
    pub period_key: String,
    /// "Jan 2024" for months, the key for weeks
    pub display: String,
    pub year: i32,
    pub gspr: Decimal,
    pub commission: Decimal,
    pub cosp: Decimal,
    /// `gspr + commission`
    pub inflows: Decimal,
    /// `cosp`
    pub outflows: Decimal,
    /// `inflows - outflows`
    pub net: Decimal,
}

impl PeriodBucket {
    fn from_parts(info: PeriodInfo, sums: LegSums) -> Self {
        Self {
            period_key: info.key,
            display: info.display,
            year: info.year,
            gspr: sums.gspr,
            commission: sums.commission,
            cosp: sums.cosp,
            inflows: sums.inflows,
            outflows: sums.outflows,
            net: sums.net,
        }
    }
}

/// Running sums for one bucket; the derived figures are kept in step so
/// every stored state is representable
#[derive(Debug, Default, Clone, Copy)]
struct LegSums {
    gspr: Decimal,
    commission: Decimal,
    cosp: Decimal,
    inflows: Decimal,
    outflows: Decimal,
    net: Decimal,
}

impl LegSums {
    /// Add a leg amount; returns false and leaves the sums untouched when any
    /// figure of the bucket would leave the `Decimal` range
    fn try_add(&mut self, kind: LegKind, amount: Decimal) -> bool {
        let mut next = *self;
        let slot = match kind {
            LegKind::Gspr => &mut next.gspr,
            LegKind::Commission => &mut next.commission,
            LegKind::Cosp => &mut next.cosp,
        };
        let Some(sum) = slot.checked_add(amount) else {
            return false;
        };
        *slot = sum;

        let Some(inflows) = next.gspr.checked_add(next.commission) else {
            return false;
        };
        let Some(net) = inflows.checked_sub(next.cosp) else {
            return false;
        };
        next.inflows = inflows;
        next.outflows = next.cosp;
        next.net = net;

        *self = next;
        true
    }
}

/// Why an amount was counted as zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticReason {
    /// The text is not a number
    Unparseable,
    /// Adding the leg would overflow its bucket
    Overflow,
}

/// An amount that was present but counted as zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub record_id: ServiceId,
    pub leg: LegKind,
    pub field: &'static str,
    pub raw: String,
    pub reason: DiagnosticReason,
}

/// Buckets plus the inputs that were counted as zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOutcome {
    pub buckets: Vec<PeriodBucket>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Group the records' dated legs into per-period totals for `selected_year`
///
/// Buckets come back sorted ascending by key with no duplicates. Unparseable
/// amounts count as zero, and so does a leg that would push any figure of its
/// bucket past the `Decimal` range; neither stops the pass.
pub fn aggregate(
    records: &[ServiceRecord],
    selected_year: i32,
    granularity: Granularity,
) -> Vec<PeriodBucket> {
    accumulate(records, selected_year, granularity, None)
}

/// Same buckets as [`aggregate`], also reporting each malformed or
/// overflowing amount on a leg in the selected year
pub fn aggregate_with_diagnostics(
    records: &[ServiceRecord],
    selected_year: i32,
    granularity: Granularity,
) -> AggregationOutcome {
    let mut diagnostics = Vec::new();
    let buckets = accumulate(records, selected_year, granularity, Some(&mut diagnostics));

    for d in &diagnostics {
        tracing::warn!(
            record = %d.record_id,
            leg = %d.leg,
            field = d.field,
            raw = %d.raw,
            reason = ?d.reason,
            "amount counted as zero"
        );
    }

    AggregationOutcome {
        buckets,
        diagnostics,
    }
}

fn accumulate(
    records: &[ServiceRecord],
    selected_year: i32,
    granularity: Granularity,
    mut diagnostics: Option<&mut Vec<ParseDiagnostic>>,
) -> Vec<PeriodBucket> {
    // BTreeMap keeps keys unique and ascending
    let mut grouping: BTreeMap<String, (PeriodInfo, LegSums)> = BTreeMap::new();

    for record in records {
        for leg in record.legs() {
            let info = period_info(leg.due_date, granularity);
            if info.year != selected_year {
                continue;
            }

            if let Some(sink) = diagnostics.as_deref_mut() {
                collect_diagnostics(record, leg.kind, sink);
            }

            let added = grouping
                .entry(info.key.clone())
                .or_insert_with(|| (info, LegSums::default()))
                .1
                .try_add(leg.kind, leg.amount);

            if !added {
                if let Some(sink) = diagnostics.as_deref_mut() {
                    sink.push(overflow_diagnostic(record, leg.kind));
                }
            }
        }
    }

    grouping
        .into_values()
        .map(|(info, sums)| PeriodBucket::from_parts(info, sums))
        .collect()
}

fn collect_diagnostics(record: &ServiceRecord, kind: LegKind, sink: &mut Vec<ParseDiagnostic>) {
    for (field, raw) in record.leg_inputs(kind) {
        // Absent fields are zero by definition, not a diagnostic
        if let Some(raw) = raw {
            if try_parse_amount(raw).is_err() {
                sink.push(ParseDiagnostic {
                    record_id: record.id,
                    leg: kind,
                    field,
                    raw: raw.to_string(),
                    reason: DiagnosticReason::Unparseable,
                });
            }
        }
    }
}

fn overflow_diagnostic(record: &ServiceRecord, kind: LegKind) -> ParseDiagnostic {
    let (field, raw) = record
        .leg_inputs(kind)
        .into_iter()
        .find(|(_, raw)| raw.is_some())
        .unwrap_or(("", None));
    ParseDiagnostic {
        record_id: record.id,
        leg: kind,
        field,
        raw: raw.unwrap_or_default().trim().to_string(),
        reason: DiagnosticReason::Overflow,
    }
}

/// Grand totals across a set of buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashFlowTotals {
    pub gspr: Decimal,
    pub commission: Decimal,
    pub cosp: Decimal,
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub net: Decimal,
}

impl CashFlowTotals {
    /// Sum every figure; each one saturates at the `Decimal` bounds
    pub fn from_buckets(buckets: &[PeriodBucket]) -> Self {
        buckets.iter().fold(Self::default(), |acc, b| Self {
            gspr: acc.gspr.saturating_add(b.gspr),
            commission: acc.commission.saturating_add(b.commission),
            cosp: acc.cosp.saturating_add(b.cosp),
            inflows: acc.inflows.saturating_add(b.inflows),
            outflows: acc.outflows.saturating_add(b.outflows),
            net: acc.net.saturating_add(b.net),
        })
    }
}

/// Distinct calendar years of every due date on every leg, ascending
pub fn available_years(records: &[ServiceRecord]) -> Vec<i32> {
    records
        .iter()
        .flat_map(|r| LegKind::ALL.into_iter().filter_map(move |k| r.due_date(k)))
        .map(|date| date.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The most recent year with any dated leg
pub fn default_year(records: &[ServiceRecord]) -> Option<i32> {
    available_years(records).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_record() -> ServiceRecord {
        ServiceRecord::new()
            .with_gspr("1000.00", date(2024, 1, 15))
            .with_commission("1000.00", "10", date(2024, 1, 20))
            .with_cosp("200.00", date(2024, 1, 25))
    }

    fn sample_records() -> Vec<ServiceRecord> {
        vec![
            full_record(),
            ServiceRecord::new()
                .with_gspr("2,500", date(2024, 3, 6))
                .with_commission("2,500", "8", date(2024, 4, 10))
                .with_cosp("900.50", date(2024, 3, 13)),
            ServiceRecord::new()
                .with_gspr("750", date(2024, 6, 19))
                .with_cosp("125.25", date(2024, 7, 3)),
            ServiceRecord::new().with_gspr("300", date(2023, 11, 8)),
        ]
    }

    #[test]
    fn test_single_record_single_month() {
        let buckets = aggregate(&[full_record()], 2024, Granularity::Month);

        assert_eq!(buckets.len(), 1);
        let b = &buckets[0];
        assert_eq!(b.period_key, "2024-01");
        assert_eq!(b.display, "Jan 2024");
        assert_eq!(b.year, 2024);
        assert_eq!(b.gspr, dec!(1000));
        assert_eq!(b.commission, dec!(100));
        assert_eq!(b.cosp, dec!(200));
        assert_eq!(b.inflows, dec!(1100));
        assert_eq!(b.outflows, dec!(200));
        assert_eq!(b.net, dec!(900));
    }

    #[test]
    fn test_other_year_yields_nothing() {
        assert!(aggregate(&[full_record()], 2023, Granularity::Month).is_empty());
    }

    #[test]
    fn test_malformed_amount_counts_as_zero() {
        let records = vec![
            ServiceRecord::new().with_gspr("500", date(2024, 1, 10)),
            ServiceRecord::new().with_gspr("abc", date(2024, 2, 10)),
        ];

        let buckets = aggregate(&records, 2024, Granularity::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period_key, "2024-01");
        assert_eq!(buckets[0].gspr, dec!(500));
        assert_eq!(buckets[1].period_key, "2024-02");
        assert_eq!(buckets[1].gspr, Decimal::ZERO);
    }

    #[test]
    fn test_malformed_leg_does_not_hide_siblings() {
        let record = ServiceRecord::new()
            .with_gspr("oops", date(2024, 5, 1))
            .with_cosp("40", date(2024, 5, 2));

        let buckets = aggregate(&[record], 2024, Granularity::Month);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].gspr, Decimal::ZERO);
        assert_eq!(buckets[0].cosp, dec!(40));
        assert_eq!(buckets[0].net, dec!(-40));
    }

    #[test]
    fn test_week_bucket_uses_iso_year() {
        let record = ServiceRecord::new().with_gspr("10", date(2024, 12, 30));

        assert!(aggregate(&[record.clone()], 2024, Granularity::Week).is_empty());

        let buckets = aggregate(&[record], 2025, Granularity::Week);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period_key, "2025-W01");
        assert_eq!(buckets[0].display, "2025-W01");
        assert_eq!(buckets[0].year, 2025);
    }

    #[test]
    fn test_one_record_spreads_across_buckets() {
        let record = ServiceRecord::new()
            .with_gspr("1000", date(2024, 1, 15))
            .with_commission("1000", "10", date(2024, 2, 20))
            .with_cosp("200", date(2024, 3, 25));

        let buckets = aggregate(&[record], 2024, Granularity::Month);
        let keys: Vec<_> = buckets.iter().map(|b| b.period_key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(buckets[0].net, dec!(1000));
        assert_eq!(buckets[1].net, dec!(100));
        assert_eq!(buckets[2].net, dec!(-200));
    }

    #[test]
    fn test_keys_strictly_ascending() {
        let records = sample_records();
        for granularity in [Granularity::Month, Granularity::Week] {
            let buckets = aggregate(&records, 2024, granularity);
            assert!(!buckets.is_empty());
            assert!(buckets
                .windows(2)
                .all(|pair| pair[0].period_key < pair[1].period_key));
        }
    }

    #[test]
    fn test_grand_net_independent_of_granularity() {
        let records = sample_records();

        let monthly = CashFlowTotals::from_buckets(&aggregate(&records, 2024, Granularity::Month));
        let weekly = CashFlowTotals::from_buckets(&aggregate(&records, 2024, Granularity::Week));

        let expected_net: Decimal = records
            .iter()
            .flat_map(|r| r.legs())
            .filter(|leg| leg.due_date.year() == 2024)
            .map(|leg| {
                if leg.kind.is_inflow() {
                    leg.amount
                } else {
                    -leg.amount
                }
            })
            .sum();

        assert_eq!(monthly.net, expected_net);
        assert_eq!(weekly.net, expected_net);
        assert_eq!(monthly, weekly);
    }

    #[test]
    fn test_weeks_are_finer_than_months() {
        let records = sample_records();
        let monthly = aggregate(&records, 2024, Granularity::Month);
        let weekly = aggregate(&records, 2024, Granularity::Week);
        assert!(weekly.len() >= monthly.len());
    }

    #[test]
    fn test_idempotent() {
        let records = sample_records();
        let first = aggregate(&records, 2024, Granularity::Week);
        let second = aggregate(&records, 2024, Granularity::Week);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], 2024, Granularity::Month).is_empty());
        assert!(available_years(&[]).is_empty());
        assert_eq!(default_year(&[]), None);
    }

    #[test]
    fn test_cleared_legs_still_count() {
        let mut record = full_record();
        record.gspr_cleared = true;
        record.cosp_cleared = true;

        let buckets = aggregate(&[record], 2024, Granularity::Month);
        assert_eq!(buckets[0].net, dec!(900));
    }

    #[test]
    fn test_diagnostics_match_buckets() {
        let records = vec![
            ServiceRecord::new()
                .with_gspr("abc", date(2024, 2, 10))
                .with_commission("1000", "ten", date(2024, 2, 11)),
            // Out of year: not counted, so not reported
            ServiceRecord::new().with_cosp("bad", date(2022, 1, 1)),
        ];

        let outcome = aggregate_with_diagnostics(&records, 2024, Granularity::Month);
        assert_eq!(outcome.buckets, aggregate(&records, 2024, Granularity::Month));

        let fields: Vec<_> = outcome.diagnostics.iter().map(|d| d.field).collect();
        assert_eq!(
            fields,
            vec!["gross_sales_price_receivable", "commission_percent"]
        );
        assert_eq!(outcome.diagnostics[1].leg, LegKind::Commission);
        assert_eq!(outcome.diagnostics[1].raw, "ten");
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.reason == DiagnosticReason::Unparseable));
    }

    const LARGEST: &str = "79228162514264337593543950335";

    #[test]
    fn test_overflowing_leg_counts_as_zero() {
        let records = vec![
            ServiceRecord::new().with_gspr(LARGEST, date(2024, 1, 1)),
            ServiceRecord::new().with_gspr(LARGEST, date(2024, 1, 2)),
            ServiceRecord::new().with_cosp("10", date(2024, 1, 3)),
        ];

        let outcome = aggregate_with_diagnostics(&records, 2024, Granularity::Month);
        assert_eq!(outcome.buckets, aggregate(&records, 2024, Granularity::Month));
        assert_eq!(outcome.buckets.len(), 1);

        let b = &outcome.buckets[0];
        assert_eq!(b.gspr, Decimal::MAX);
        assert_eq!(b.inflows, Decimal::MAX);
        assert_eq!(b.cosp, dec!(10));
        assert_eq!(b.net, Decimal::MAX - dec!(10));

        assert_eq!(outcome.diagnostics.len(), 1);
        let d = &outcome.diagnostics[0];
        assert_eq!(d.record_id, records[1].id);
        assert_eq!(d.reason, DiagnosticReason::Overflow);
        assert_eq!(d.field, "gross_sales_price_receivable");
        assert_eq!(d.raw, LARGEST);
    }

    #[test]
    fn test_net_overflow_drops_the_leg() {
        // A negative payable would push net past the maximum
        let record = ServiceRecord::new()
            .with_gspr(LARGEST, date(2024, 3, 1))
            .with_cosp("-1", date(2024, 3, 2));

        let outcome = aggregate_with_diagnostics(&[record], 2024, Granularity::Week);
        let total_cosp: Decimal = outcome.buckets.iter().map(|b| b.cosp).sum();
        assert_eq!(total_cosp, Decimal::ZERO);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].leg, LegKind::Cosp);

        let buckets = aggregate(
            &[ServiceRecord::new()
                .with_gspr(LARGEST, date(2024, 3, 1))
                .with_cosp("-1", date(2024, 3, 2))],
            2024,
            Granularity::Month,
        );
        assert_eq!(buckets[0].net, Decimal::MAX);
        assert_eq!(buckets[0].cosp, Decimal::ZERO);
    }

    #[test]
    fn test_totals_saturate() {
        let records = vec![
            ServiceRecord::new().with_gspr(LARGEST, date(2024, 1, 1)),
            ServiceRecord::new().with_gspr(LARGEST, date(2024, 2, 1)),
            ServiceRecord::new().with_cosp(LARGEST, date(2024, 3, 1)),
            ServiceRecord::new().with_cosp(LARGEST, date(2024, 4, 1)),
        ];

        let buckets = aggregate(&records, 2024, Granularity::Month);
        assert_eq!(buckets.len(), 4);

        let totals = CashFlowTotals::from_buckets(&buckets);
        assert_eq!(totals.gspr, Decimal::MAX);
        assert_eq!(totals.inflows, Decimal::MAX);
        assert_eq!(totals.outflows, Decimal::MAX);
        // MAX, MAX (saturated), 0, then -MAX
        assert_eq!(totals.net, Decimal::MIN);
    }

    #[test]
    fn test_available_and_default_years() {
        let records = sample_records();
        assert_eq!(available_years(&records), vec![2023, 2024]);
        assert_eq!(default_year(&records), Some(2024));

        // Calendar year, even when the ISO week belongs to the next year
        let edge = vec![ServiceRecord::new().with_gspr("1", date(2024, 12, 30))];
        assert_eq!(available_years(&edge), vec![2024]);
    }
}
