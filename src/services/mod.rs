//! Service layer for cashflow-cli
//!
//! The service layer provides business logic on top of the storage layer:
//! record validation and change notification, period aggregation, and the
//! outstanding-dues listing.

pub mod aggregation;
pub mod dues;
pub mod record;

pub use aggregation::{
    aggregate, aggregate_with_diagnostics, available_years, default_year, AggregationOutcome,
    CashFlowTotals, DiagnosticReason, ParseDiagnostic, PeriodBucket,
};
pub use dues::{outstanding, DueFilter, DueItem, DueKind};
pub use record::{RecordService, ServiceFields};
