//! Amount parsing for free-form monetary and percentage strings
//!
//! Service records keep their amounts as the text the user typed. These
//! helpers turn that text into exact [`Decimal`] values: first with en_US
//! number conventions (`,` grouping, `.` decimal point), then as a plain
//! numeric literal. [`parse_amount`] never fails; malformed or absent input is
//! zero.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Error returned by [`try_parse_amount`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid amount: {0}")]
    InvalidFormat(String),
}

/// Parse an optional amount string, treating absence and garbage as zero
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| try_parse_amount(s).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Parse an amount string strictly
///
/// Accepts "1,234.56", "-10.5", "+3", ".75", "1000", and numeric literals
/// such as "1e3".
pub fn try_parse_amount(raw: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }

    if let Some(value) = parse_en_us(trimmed) {
        return Ok(value);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AmountParseError::InvalidFormat(trimmed.to_string()))
}

/// en_US decimal grammar: `[+-]d{1,3}(,ddd)*(.d*)?` or ungrouped digits
fn parse_en_us(s: &str) -> Option<Decimal> {
    let (negative, body) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (body, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let groups: Vec<&str> = int_part.split(',').collect();
    if groups.len() > 1
        && (groups[0].is_empty()
            || groups[0].len() > 3
            || groups[1..].iter().any(|g| g.len() != 3))
    {
        return None;
    }

    let digits = groups.concat();
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(&digits) || !all_digits(frac_part) {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + frac_part.len() + 3);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if digits.is_empty() { "0" } else { &digits });
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }

    Decimal::from_str(&normalized).ok()
}
