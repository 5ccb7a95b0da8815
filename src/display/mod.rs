//! Display formatting for terminal output
//!
//! Provides utilities for formatting records, dues and amounts for terminal
//! display as aligned tables and detail views.

pub mod currency;
pub mod dues;
pub mod record;

pub use currency::format_currency;
pub use dues::format_due_list;
pub use record::{format_service_details, format_service_list};
