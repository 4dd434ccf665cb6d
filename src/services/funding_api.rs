//! Trait and query types for reading E-Rate funding records.

use std::ops::RangeInclusive;

use crate::error::Result;
use crate::record::RawLineItem;
use crate::validate::{FundingYear, StateCode};

/// How an organization name is compared against the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Case-insensitive equality.
    Exact,
    /// Case-insensitive substring.
    Partial,
}

/// Which line items to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemQuery {
    /// Every current line item for one organization across a span of years.
    OrganizationHistory {
        organization: String,
        years: RangeInclusive<i32>,
        name_match: NameMatch,
    },
    /// Every current line item filed in one state for one funding year.
    StateYear { state: StateCode, year: FundingYear },
}

impl LineItemQuery {
    /// Short human-readable description, used in logs and the JSON export.
    pub fn describe(&self) -> String {
        match self {
            LineItemQuery::OrganizationHistory {
                organization,
                years,
                name_match,
            } => {
                let how = match name_match {
                    NameMatch::Exact => "exact",
                    NameMatch::Partial => "partial",
                };
                format!(
                    "organization '{}' ({} match), funding years {}-{}",
                    organization,
                    how,
                    years.start(),
                    years.end()
                )
            }
            LineItemQuery::StateYear { state, year } => {
                format!("state {state}, funding year {year}")
            }
        }
    }
}

/// Parameters of an organization name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSearch {
    pub term: String,
    pub state: Option<StateCode>,
}

/// Abstraction over the funding-record source (e.g., USAC Open Data).
pub trait FundingApi {
    /// Returns every raw line item matching `query`, across all pages.
    fn line_items(&self, query: &LineItemQuery) -> Result<Vec<RawLineItem>>;

    /// Returns distinct (organization, state, funding year) rows whose
    /// organization name contains the search term.
    fn organization_rows(&self, search: &OrganizationSearch) -> Result<Vec<RawLineItem>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let query = LineItemQuery::OrganizationHistory {
            organization: "TULSA".to_string(),
            years: 2016..=2025,
            name_match: NameMatch::Partial,
        };
        assert_eq!(
            query.describe(),
            "organization 'TULSA' (partial match), funding years 2016-2025"
        );

        let query = LineItemQuery::StateYear {
            state: "ok".parse().unwrap(),
            year: "2024".parse().unwrap(),
        };
        assert_eq!(query.describe(), "state OK, funding year 2024");
    }
}
