use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::error::Result;
use crate::record::RawLineItem;
use crate::services::funding_api::{FundingApi, OrganizationSearch};

/// An organization found by name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMatch {
    pub name: String,
    /// Last non-empty state reported for the organization.
    pub state: Option<String>,
    pub years: BTreeSet<i32>,
}

/// Looks up organizations whose name contains the search term.
pub fn find_organizations<A: FundingApi>(
    api: &A,
    search: &OrganizationSearch,
    limit: usize,
) -> Result<Vec<OrganizationMatch>> {
    let rows = api.organization_rows(search)?;
    info!(rows = rows.len(), "Search rows fetched");

    let matches = summarize_organizations(rows, limit);
    info!(organizations = matches.len(), "Unique organizations found");
    Ok(matches)
}

/// Collapses (name, state, year) rows into one entry per organization name,
/// ordered case-insensitively by name and cut to `limit`.
pub fn summarize_organizations(rows: Vec<RawLineItem>, limit: usize) -> Vec<OrganizationMatch> {
    let mut by_name: HashMap<String, OrganizationMatch> = HashMap::new();

    for row in rows {
        let Some(name) = row
            .organization_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        else {
            continue;
        };

        let entry = by_name
            .entry(name.clone())
            .or_insert_with(|| OrganizationMatch {
                name,
                state: None,
                years: BTreeSet::new(),
            });

        if let Some(state) = row.state.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            entry.state = Some(state);
        }
        if let Some(year) = row.funding_year.and_then(|y| y.trim().parse::<i32>().ok()) {
            entry.years.insert(year);
        }
    }

    let mut matches: Vec<OrganizationMatch> = by_name.into_values().collect();
    matches.sort_by(|a, b| {
        a.name
            .to_uppercase()
            .cmp(&b.name.to_uppercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, state: &str, year: &str) -> RawLineItem {
        RawLineItem {
            organization_name: Some(name.to_string()),
            state: Some(state.to_string()),
            funding_year: Some(year.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_summarize_merges_years() {
        let rows = vec![
            row("PIEDMONT USD", "CA", "2020"),
            row("Piedmont City SD", "AL", "2019"),
            row("PIEDMONT USD", "CA", "2018"),
            row("PIEDMONT USD", "", "2020"),
        ];

        let matches = summarize_organizations(rows, 10);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Piedmont City SD");
        assert_eq!(matches[1].name, "PIEDMONT USD");
        assert_eq!(matches[1].state.as_deref(), Some("CA"));
        assert_eq!(matches[1].years.iter().copied().collect::<Vec<_>>(), vec![2018, 2020]);
    }

    #[test]
    fn test_summarize_skips_blank_names_and_limits() {
        let rows = vec![
            row("", "OK", "2020"),
            row("B", "OK", "2020"),
            row("A", "OK", "2020"),
            row("C", "OK", "2020"),
        ];

        let matches = summarize_organizations(rows, 2);
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
