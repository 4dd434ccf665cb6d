//! Validated argument types for state codes, funding years, and thresholds.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;

use crate::error::{ErateError, Result};

/// First funding year published in the FRN line-item dataset.
pub const FIRST_FUNDING_YEAR: i32 = 2016;
/// Last funding year accepted on the command line.
pub const LAST_FUNDING_YEAR: i32 = 2030;

/// Two-letter postal abbreviation, stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateCode(String);

impl StateCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StateCode {
    type Err = ErateError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ErateError::invalid(format!(
                "state must be a 2-letter code (e.g. OK, TX, CA), got '{s}'"
            )));
        }
        Ok(StateCode(trimmed.to_ascii_uppercase()))
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A four-digit E-Rate funding year within the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FundingYear(i32);

impl FundingYear {
    pub fn new(year: i32) -> Result<Self> {
        if !(FIRST_FUNDING_YEAR..=LAST_FUNDING_YEAR).contains(&year) {
            return Err(ErateError::invalid(format!(
                "year must be between {FIRST_FUNDING_YEAR} and {LAST_FUNDING_YEAR}, got {year}"
            )));
        }
        Ok(FundingYear(year))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl FromStr for FundingYear {
    type Err = ErateError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ErateError::invalid(format!(
                "year must be a 4-digit number, got '{s}'"
            )));
        }
        let year = trimmed
            .parse::<i32>()
            .map_err(|e| ErateError::invalid(format!("invalid year '{s}': {e}")))?;
        FundingYear::new(year)
    }
}

impl fmt::Display for FundingYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a dollar threshold. Accepts plain decimals, optionally with a
/// leading `$` and `,` separators.
pub fn parse_threshold(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value = Decimal::from_str(&cleaned)
        .map_err(|e| ErateError::invalid(format!("invalid threshold '{s}': {e}")))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ErateError::invalid(format!(
            "threshold must be non-negative, got '{s}'"
        )));
    }
    Ok(value)
}

/// Non-empty organization name, trimmed.
pub fn organization_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ErateError::invalid("organization name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Funding years covered by a school history query.
///
/// Defaults to everything from [`FIRST_FUNDING_YEAR`] through next year,
/// since applications for the upcoming year are filed in the spring.
pub fn history_years(
    from: Option<FundingYear>,
    to: Option<FundingYear>,
) -> Result<RangeInclusive<i32>> {
    let first = from.map_or(FIRST_FUNDING_YEAR, FundingYear::get);
    let last = to.map_or_else(
        || (Utc::now().year() + 1).clamp(FIRST_FUNDING_YEAR, LAST_FUNDING_YEAR),
        FundingYear::get,
    );
    if first > last {
        return Err(ErateError::invalid(format!(
            "--from-year {first} is after --to-year {last}"
        )));
    }
    Ok(first..=last)
}
