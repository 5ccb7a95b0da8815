//! Report periods
//!
//! Cash-flow legs are bucketed either by calendar month (`2024-01`) or by ISO
//! week (`2025-W01`). Both key forms are zero-padded and fixed width, so
//! sorting keys as strings sorts periods chronologically.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucketing granularity for cash-flow reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar months (default)
    #[default]
    Month,
    /// ISO-8601 weeks
    Week,
}

impl Granularity {
    /// Parse a granularity name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" | "m" => Some(Self::Month),
            "week" | "weekly" | "w" => Some(Self::Week),
            _ => None,
        }
    }

    /// Title used in report headers
    pub fn title(&self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Week => "Week",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A single month or ISO week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Calendar month, e.g. "2024-01"
    Monthly { year: i32, month: u32 },
    /// ISO week, keyed by its week-numbering year, e.g. "2025-W01"
    Weekly { year: i32, week: u32 },
}

impl Period {
    /// The period of the given granularity that contains `date`
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Month => Self::Monthly {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Week => {
                let iso = date.iso_week();
                Self::Weekly {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
        }
    }

    /// Year the period is filed under (ISO week-numbering year for weeks)
    pub fn year(&self) -> i32 {
        match self {
            Self::Monthly { year, .. } | Self::Weekly { year, .. } => *year,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Monthly { .. } => Granularity::Month,
            Self::Weekly { .. } => Granularity::Week,
        }
    }

    /// First day of the period, if the period is a real calendar period
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Monthly { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1),
            Self::Weekly { year, week } => NaiveDate::from_isoywd_opt(*year, *week, Weekday::Mon),
        }
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date, self.granularity()) == *self
    }

    /// Human-readable label: "Jan 2024" for months, the key for weeks
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Monthly { .. } => self.start_date().map(|d| d.format("%b %Y").to_string()),
            Self::Weekly { .. } => Some(self.to_string()),
        }
    }

    /// Parse a period key
    ///
    /// Formats:
    /// - Monthly: "2024-01"
    /// - Weekly: "2025-W01"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let invalid = || PeriodParseError::InvalidFormat(s.to_string());

        if let Some((year, week)) = s.split_once("-W") {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let week: u32 = week.parse().map_err(|_| invalid())?;
            let period = Self::Weekly { year, week };
            return match period.start_date() {
                Some(_) => Ok(period),
                None => Err(PeriodParseError::InvalidWeek(week)),
            };
        }

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }

        Ok(Self::Monthly { year, month })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Weekly { year, week } => write!(f, "{:04}-W{:02}", year, week),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodParseError {
    #[error("Invalid period format: {0}")]
    InvalidFormat(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    #[error("Invalid ISO week: {0}")]
    InvalidWeek(u32),
}

/// Where a dated leg lands: bucket key, label, and the year used for filtering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeriodInfo {
    pub year: i32,
    pub key: String,
    pub display: String,
}

impl PeriodInfo {
    /// Zero year and empty strings; sorts before every real key
    pub fn degenerate() -> Self {
        Self {
            year: 0,
            key: String::new(),
            display: String::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.key.is_empty()
    }
}

/// Derive the bucket for `date` at the given granularity
///
/// Month labels come from the first day of the month, in English regardless
/// of the process locale. If that day cannot be constructed the degenerate
/// info is returned instead of failing.
pub fn period_info(date: NaiveDate, granularity: Granularity) -> PeriodInfo {
    let period = Period::containing(date, granularity);
    match period.label() {
        Some(display) => PeriodInfo {
            year: period.year(),
            key: period.to_string(),
            display,
        },
        None => PeriodInfo::degenerate(),
    }
}
