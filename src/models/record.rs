//! Service record model
//!
//! A service carries up to three cash-flow legs, each with its own due date:
//! the gross sales price receivable (GSPR), the commission receivable, and the
//! cost of sales payable (COSP). Amounts stay as the text that was entered;
//! the legs derive exact values from it on demand.
//!
//! A service may also owe a revenue share to a counterparty. That payable is
//! tracked for dues only and never enters the period aggregation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ServiceId;
use super::money::{parse_amount, try_parse_amount};

/// Which leg of a service a cash flow belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Gross sales price receivable
    Gspr,
    /// Commission receivable
    Commission,
    /// Cost of sales payable
    Cosp,
}

impl LegKind {
    pub const ALL: [LegKind; 3] = [LegKind::Gspr, LegKind::Commission, LegKind::Cosp];

    /// Inflow legs add to net cash, outflow legs subtract
    pub fn is_inflow(&self) -> bool {
        !matches!(self, Self::Cosp)
    }

    /// Parse a leg name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gspr" | "receivable" => Some(Self::Gspr),
            "commission" | "comm" => Some(Self::Commission),
            "cosp" | "payable" => Some(Self::Cosp),
            _ => None,
        }
    }
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gspr => write!(f, "GSPR"),
            Self::Commission => write!(f, "Commission"),
            Self::Cosp => write!(f, "COSP"),
        }
    }
}

/// One dated cash flow derived from a service record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowLeg {
    pub kind: LegKind,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// A tracked service with its receivable and payable legs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,

    #[serde(default)]
    pub client_first_name: String,

    #[serde(default)]
    pub client_last_name: String,

    #[serde(default)]
    pub service_type: String,

    #[serde(default)]
    pub notes: String,

    /// Agent the commission is collected from
    #[serde(default)]
    pub agent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_sales_price_receivable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_sales_commissionable: Option<String>,

    /// Commission rate in percent, e.g. "10" for 10%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_percent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_sales_payable: Option<String>,

    #[serde(default)]
    pub gspr_due_date: Option<NaiveDate>,

    #[serde(default)]
    pub comm_due_date: Option<NaiveDate>,

    #[serde(default)]
    pub cosp_due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_share_payable: Option<String>,

    #[serde(default)]
    pub rev_share_due_date: Option<NaiveDate>,

    /// Who the revenue share is owed to
    #[serde(default)]
    pub rev_share_counterparty: String,

    /// GSPR has been collected
    #[serde(default)]
    pub gspr_cleared: bool,

    /// Commission has been received
    #[serde(default)]
    pub commission_received: bool,

    /// COSP has been paid
    #[serde(default)]
    pub cosp_cleared: bool,

    /// Revenue share has been paid
    #[serde(default)]
    pub rev_share_paid: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    /// Create an empty record
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            client_first_name: String::new(),
            client_last_name: String::new(),
            service_type: String::new(),
            notes: String::new(),
            agent: String::new(),
            gross_sales_price_receivable: None,
            gross_sales_commissionable: None,
            commission_percent: None,
            cost_of_sales_payable: None,
            gspr_due_date: None,
            comm_due_date: None,
            cosp_due_date: None,
            revenue_share_payable: None,
            rev_share_due_date: None,
            rev_share_counterparty: String::new(),
            gspr_cleared: false,
            commission_received: false,
            cosp_cleared: false,
            rev_share_paid: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the GSPR leg
    pub fn with_gspr(mut self, amount: impl Into<String>, due: NaiveDate) -> Self {
        self.gross_sales_price_receivable = Some(amount.into());
        self.gspr_due_date = Some(due);
        self
    }

    /// Set the commission leg
    pub fn with_commission(
        mut self,
        commissionable: impl Into<String>,
        percent: impl Into<String>,
        due: NaiveDate,
    ) -> Self {
        self.gross_sales_commissionable = Some(commissionable.into());
        self.commission_percent = Some(percent.into());
        self.comm_due_date = Some(due);
        self
    }

    /// Set the COSP leg
    pub fn with_cosp(mut self, amount: impl Into<String>, due: NaiveDate) -> Self {
        self.cost_of_sales_payable = Some(amount.into());
        self.cosp_due_date = Some(due);
        self
    }

    /// Set the revenue share payable and who it is owed to
    pub fn with_rev_share(
        mut self,
        amount: impl Into<String>,
        counterparty: impl Into<String>,
        due: NaiveDate,
    ) -> Self {
        self.revenue_share_payable = Some(amount.into());
        self.rev_share_counterparty = counterparty.into();
        self.rev_share_due_date = Some(due);
        self
    }

    /// Set the client name
    pub fn with_client(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.client_first_name = first.into();
        self.client_last_name = last.into();
        self
    }

    /// "First Last", trimmed
    pub fn client_name(&self) -> String {
        format!("{} {}", self.client_first_name, self.client_last_name)
            .trim()
            .to_string()
    }

    pub fn gspr_amount(&self) -> Decimal {
        parse_amount(self.gross_sales_price_receivable.as_deref())
    }

    /// Commissionable amount times percent / 100; each factor is zero if unparseable
    pub fn commission_amount(&self) -> Decimal {
        let commissionable = parse_amount(self.gross_sales_commissionable.as_deref());
        let percent = parse_amount(self.commission_percent.as_deref());
        commissionable
            .checked_mul(percent / Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn cosp_amount(&self) -> Decimal {
        parse_amount(self.cost_of_sales_payable.as_deref())
    }

    pub fn rev_share_amount(&self) -> Decimal {
        parse_amount(self.revenue_share_payable.as_deref())
    }

    /// Amount of the given leg
    pub fn leg_amount(&self, kind: LegKind) -> Decimal {
        match kind {
            LegKind::Gspr => self.gspr_amount(),
            LegKind::Commission => self.commission_amount(),
            LegKind::Cosp => self.cosp_amount(),
        }
    }

    /// Due date of the given leg
    pub fn due_date(&self, kind: LegKind) -> Option<NaiveDate> {
        match kind {
            LegKind::Gspr => self.gspr_due_date,
            LegKind::Commission => self.comm_due_date,
            LegKind::Cosp => self.cosp_due_date,
        }
    }

    /// Raw amount fields that feed the given leg, by field name
    pub fn leg_inputs(&self, kind: LegKind) -> Vec<(&'static str, Option<&str>)> {
        match kind {
            LegKind::Gspr => vec![(
                "gross_sales_price_receivable",
                self.gross_sales_price_receivable.as_deref(),
            )],
            LegKind::Commission => vec![
                (
                    "gross_sales_commissionable",
                    self.gross_sales_commissionable.as_deref(),
                ),
                ("commission_percent", self.commission_percent.as_deref()),
            ],
            LegKind::Cosp => vec![(
                "cost_of_sales_payable",
                self.cost_of_sales_payable.as_deref(),
            )],
        }
    }

    /// Every leg that has a due date, in GSPR, commission, COSP order
    pub fn legs(&self) -> Vec<CashFlowLeg> {
        LegKind::ALL
            .iter()
            .filter_map(|&kind| {
                self.due_date(kind).map(|due_date| CashFlowLeg {
                    kind,
                    due_date,
                    amount: self.leg_amount(kind),
                })
            })
            .collect()
    }

    /// Whether the leg has been collected or paid
    pub fn is_leg_cleared(&self, kind: LegKind) -> bool {
        match kind {
            LegKind::Gspr => self.gspr_cleared,
            LegKind::Commission => self.commission_received,
            LegKind::Cosp => self.cosp_cleared,
        }
    }

    pub fn set_leg_cleared(&mut self, kind: LegKind, cleared: bool) {
        match kind {
            LegKind::Gspr => self.gspr_cleared = cleared,
            LegKind::Commission => self.commission_received = cleared,
            LegKind::Cosp => self.cosp_cleared = cleared,
        }
        self.touch();
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate user-entered data
    ///
    /// Stored records may hold anything; this is what the record service
    /// enforces on create and edit.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        let has_identity = !self.client_name().is_empty() || !self.service_type.trim().is_empty();
        let amount_inputs: Vec<_> = LegKind::ALL
            .iter()
            .flat_map(|&k| self.leg_inputs(k))
            .chain(std::iter::once((
                "revenue_share_payable",
                self.revenue_share_payable.as_deref(),
            )))
            .collect();

        let has_leg = LegKind::ALL.iter().any(|&k| self.due_date(k).is_some())
            || self.rev_share_due_date.is_some()
            || amount_inputs.iter().any(|(_, raw)| raw.is_some());
        if !has_identity && !has_leg {
            return Err(RecordValidationError::Empty);
        }

        for (field, raw) in amount_inputs {
            if let Some(raw) = raw {
                if try_parse_amount(raw).is_err() {
                    return Err(RecordValidationError::InvalidAmount {
                        field,
                        value: raw.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for ServiceRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation errors for service records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordValidationError {
    #[error("Service needs a client, a service type, or at least one leg")]
    Empty,
    #[error("Invalid amount for {field}: '{value}'")]
    InvalidAmount { field: &'static str, value: String },
}
