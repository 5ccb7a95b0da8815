//! Outstanding receivables and payables
//!
//! Lists every dated leg that has not yet been collected, received, or paid,
//! plus any unpaid revenue share, soonest due first.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::models::{LegKind, Period, ServiceId, ServiceRecord};

/// Kind of outstanding item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueKind {
    ReceivableGspr,
    ReceivableCommission,
    PayableCosp,
    PayableRevShare,
}

impl DueKind {
    /// Aggregated leg behind this item; revenue share has none
    pub fn leg(&self) -> Option<LegKind> {
        match self {
            Self::ReceivableGspr => Some(LegKind::Gspr),
            Self::ReceivableCommission => Some(LegKind::Commission),
            Self::PayableCosp => Some(LegKind::Cosp),
            Self::PayableRevShare => None,
        }
    }

    pub fn from_leg(kind: LegKind) -> Self {
        match kind {
            LegKind::Gspr => Self::ReceivableGspr,
            LegKind::Commission => Self::ReceivableCommission,
            LegKind::Cosp => Self::PayableCosp,
        }
    }

    /// Parse a filter name: receivable, commission, payable, revshare
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "receivable" | "gspr" => Some(Self::ReceivableGspr),
            "commission" | "comm" => Some(Self::ReceivableCommission),
            "payable" | "cosp" => Some(Self::PayableCosp),
            "revshare" | "rev-share" | "revenue-share" => Some(Self::PayableRevShare),
            _ => None,
        }
    }

    pub fn is_receivable(&self) -> bool {
        !matches!(self, Self::PayableCosp | Self::PayableRevShare)
    }
}

impl fmt::Display for DueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReceivableGspr => write!(f, "Receivable (GSPR)"),
            Self::ReceivableCommission => write!(f, "Commission Receivable"),
            Self::PayableCosp => write!(f, "Payable (COSP)"),
            Self::PayableRevShare => write!(f, "Revenue Share Payable"),
        }
    }
}

/// One outstanding leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueItem {
    pub record_id: ServiceId,
    pub kind: DueKind,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    /// Amount text as entered; for commissions, the commissionable amount
    pub amount_text: String,
    pub client: String,
    /// Commission agent or revenue share recipient; empty for other kinds
    pub counterparty: String,
    pub service_type: String,
    pub notes: String,
}

/// Which outstanding items to list
#[derive(Debug, Clone, Default)]
pub struct DueFilter {
    pub kind: Option<DueKind>,
    /// Only items due on or before this date
    pub until: Option<NaiveDate>,
    /// Only items due within this month or week
    pub period: Option<Period>,
}

impl DueFilter {
    fn accepts(&self, kind: DueKind, due: NaiveDate) -> bool {
        self.kind.map_or(true, |k| k == kind)
            && self.until.map_or(true, |until| due <= until)
            && self.period.map_or(true, |p| p.contains(due))
    }
}

/// Uncleared dated legs and unpaid revenue shares matching `filter`,
/// ordered by due date then kind
pub fn outstanding(records: &[ServiceRecord], filter: &DueFilter) -> Vec<DueItem> {
    let mut items: Vec<DueItem> = records
        .iter()
        .flat_map(|record| {
            let legs = record
                .legs()
                .into_iter()
                .filter(move |leg| !record.is_leg_cleared(leg.kind))
                .map(move |leg| {
                    (
                        record,
                        DueKind::from_leg(leg.kind),
                        leg.due_date,
                        leg.amount,
                    )
                });
            let rev_share = record
                .rev_share_due_date
                .filter(|_| !record.rev_share_paid)
                .map(|due| {
                    (
                        record,
                        DueKind::PayableRevShare,
                        due,
                        record.rev_share_amount(),
                    )
                });
            legs.chain(rev_share)
        })
        .filter(|&(_, kind, due, _)| filter.accepts(kind, due))
        .map(|(record, kind, due_date, amount)| DueItem {
            record_id: record.id,
            kind,
            due_date,
            amount,
            amount_text: amount_text(record, kind),
            client: record.client_name(),
            counterparty: counterparty(record, kind),
            service_type: record.service_type.clone(),
            notes: record.notes.clone(),
        })
        .collect();

    items.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then(a.kind.cmp(&b.kind))
            .then(a.record_id.cmp(&b.record_id))
    });
    items
}

fn amount_text(record: &ServiceRecord, kind: DueKind) -> String {
    let raw = match kind {
        DueKind::ReceivableGspr => &record.gross_sales_price_receivable,
        DueKind::ReceivableCommission => &record.gross_sales_commissionable,
        DueKind::PayableCosp => &record.cost_of_sales_payable,
        DueKind::PayableRevShare => &record.revenue_share_payable,
    };
    raw.as_deref().unwrap_or("").trim().to_string()
}

fn counterparty(record: &ServiceRecord, kind: DueKind) -> String {
    match kind {
        DueKind::ReceivableCommission => record.agent.clone(),
        DueKind::PayableRevShare => record.rev_share_counterparty.clone(),
        _ => String::new(),
    }
}

/// Receivable and payable sums over a list of items
///
/// Each sum saturates at the `Decimal` bounds.
pub fn totals(items: &[DueItem]) -> (Decimal, Decimal) {
    items.iter().fold((Decimal::ZERO, Decimal::ZERO), |(rec, pay), item| {
        if item.kind.is_receivable() {
            (rec.saturating_add(item.amount), pay)
        } else {
            (rec, pay.saturating_add(item.amount))
        }
    })
}
