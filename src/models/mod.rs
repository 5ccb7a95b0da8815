//! Core data models for cashflow-cli
//!
//! Service records with their three dated cash-flow legs, the periods those
//! legs are bucketed into, and amount parsing.

pub mod ids;
pub mod money;
pub mod period;
pub mod record;

pub use ids::ServiceId;
pub use money::{parse_amount, try_parse_amount, AmountParseError};
pub use period::{period_info, Granularity, Period, PeriodInfo, PeriodParseError};
pub use record::{CashFlowLeg, LegKind, RecordValidationError, ServiceRecord};
