use std::ops::RangeInclusive;

use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::{Grouping, Report, Thresholds};
use crate::analyzers::vendor::VendorFilter;
use crate::error::Result;
use crate::record::{LineItem, RawLineItem};
use crate::services::funding_api::{FundingApi, LineItemQuery, NameMatch};
use crate::validate::{FundingYear, StateCode};

/// Inputs for the per-organization history report.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub organization: String,
    pub years: RangeInclusive<i32>,
    pub thresholds: Thresholds,
    pub vendors: VendorFilter,
}

/// Inputs for the state/year report.
#[derive(Debug, Clone)]
pub struct StateYearRequest {
    pub state: StateCode,
    pub year: FundingYear,
    pub thresholds: Thresholds,
    pub vendors: VendorFilter,
}

/// Fetches one organization's line items across the requested years and
/// groups them by funding year.
///
/// An exact name match is tried first; if it finds nothing, the name is
/// retried as a substring match.
pub fn school_history<A: FundingApi>(api: &A, request: &HistoryRequest) -> Result<Report> {
    let mut query = LineItemQuery::OrganizationHistory {
        organization: request.organization.clone(),
        years: request.years.clone(),
        name_match: NameMatch::Exact,
    };
    info!(query = %query.describe(), "Fetching organization history");
    let mut raw = api.line_items(&query)?;

    if raw.is_empty() {
        query = LineItemQuery::OrganizationHistory {
            organization: request.organization.clone(),
            years: request.years.clone(),
            name_match: NameMatch::Partial,
        };
        info!(query = %query.describe(), "No exact match, trying partial match");
        raw = api.line_items(&query)?;
    }

    build_report(
        raw,
        Grouping::OrganizationYear,
        request.thresholds,
        request.vendors,
    )
}

/// Fetches every line item for a state and funding year, grouped by
/// organization.
pub fn state_year<A: FundingApi>(api: &A, request: &StateYearRequest) -> Result<Report> {
    let query = LineItemQuery::StateYear {
        state: request.state.clone(),
        year: request.year,
    };
    info!(query = %query.describe(), "Fetching state line items");
    let raw = api.line_items(&query)?;

    build_report(
        raw,
        Grouping::Organization,
        request.thresholds,
        request.vendors,
    )
}

/// Converts, filters by vendor, and aggregates a fetched record set.
pub fn build_report(
    raw: Vec<RawLineItem>,
    grouping: Grouping,
    thresholds: Thresholds,
    vendors: VendorFilter,
) -> Result<Report> {
    let fetched = raw.len();
    let items: Vec<LineItem> = raw
        .into_iter()
        .map(LineItem::from_raw)
        .filter(|item| vendors.accepts(item))
        .collect();
    info!(fetched, kept = items.len(), ?vendors, "Line items filtered");

    let report = Report::new(aggregate(items, grouping)?, thresholds, fetched)?;
    info!(
        groups = report.groups().len(),
        displayed = report.displayed().count(),
        total = %report.total(),
        "Aggregation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::funding_api::OrganizationSearch;
    use rust_decimal::Decimal;
    use std::cell::RefCell;

    /// Answers exact-match queries with `exact` and partial ones with `partial`.
    struct FakeApi {
        exact: Vec<RawLineItem>,
        partial: Vec<RawLineItem>,
        queries: RefCell<Vec<LineItemQuery>>,
    }

    impl FundingApi for FakeApi {
        fn line_items(&self, query: &LineItemQuery) -> Result<Vec<RawLineItem>> {
            self.queries.borrow_mut().push(query.clone());
            Ok(match query {
                LineItemQuery::OrganizationHistory {
                    name_match: NameMatch::Partial,
                    ..
                } => self.partial.clone(),
                _ => self.exact.clone(),
            })
        }

        fn organization_rows(&self, _search: &OrganizationSearch) -> Result<Vec<RawLineItem>> {
            Ok(Vec::new())
        }
    }

    fn raw(org: &str, year: &str, manufacturer: &str, cost: &str) -> RawLineItem {
        RawLineItem {
            organization_name: Some(org.to_string()),
            funding_year: Some(year.to_string()),
            form_471_manufacturer_name: Some(manufacturer.to_string()),
            pre_discount_extended_eligible_line_item_costs: Some(cost.to_string()),
            ..Default::default()
        }
    }

    fn history_request() -> HistoryRequest {
        HistoryRequest {
            organization: "TULSA".to_string(),
            years: 2020..=2024,
            thresholds: Thresholds::new(Decimal::ZERO, Decimal::from(100_000)).unwrap(),
            vendors: VendorFilter::NetworkEquipment,
        }
    }

    #[test]
    fn test_school_history_exact_match_skips_fallback() {
        let api = FakeApi {
            exact: vec![raw("TULSA", "2024", "Cisco", "10")],
            partial: vec![raw("TULSA PUBLIC", "2024", "Cisco", "99")],
            queries: RefCell::new(Vec::new()),
        };

        let report = school_history(&api, &history_request()).unwrap();
        assert_eq!(api.queries.borrow().len(), 1);
        assert_eq!(report.total(), Decimal::from(10));
    }

    #[test]
    fn test_school_history_falls_back_to_partial() {
        let api = FakeApi {
            exact: Vec::new(),
            partial: vec![
                raw("TULSA PUBLIC", "2023", "Cisco", "100"),
                raw("TULSA PUBLIC", "2024", "Aruba", "250"),
            ],
            queries: RefCell::new(Vec::new()),
        };

        let report = school_history(&api, &history_request()).unwrap();
        assert_eq!(api.queries.borrow().len(), 2);
        assert_eq!(report.groups().len(), 2);
        assert_eq!(report.groups()[0].funding_year(), Some(2024));
    }

    #[test]
    fn test_build_report_applies_vendor_filter_before_totals() {
        let rows = vec![
            raw("A", "2024", "Cisco", "100"),
            raw("A", "2024", "Comcast", "900"),
        ];
        let thresholds = Thresholds::new(Decimal::ZERO, Decimal::ZERO).unwrap();

        let filtered = build_report(
            rows.clone(),
            Grouping::Organization,
            thresholds,
            VendorFilter::NetworkEquipment,
        )
        .unwrap();
        assert_eq!(filtered.fetched_records(), 2);
        assert_eq!(filtered.record_count(), 1);
        assert_eq!(filtered.total(), Decimal::from(100));

        let all = build_report(rows, Grouping::Organization, thresholds, VendorFilter::All).unwrap();
        assert_eq!(all.record_count(), 2);
        assert_eq!(all.total(), Decimal::from(1000));
    }

    #[test]
    fn test_state_year_empty_result_is_not_an_error() {
        let api = FakeApi {
            exact: Vec::new(),
            partial: Vec::new(),
            queries: RefCell::new(Vec::new()),
        };
        let request = StateYearRequest {
            state: "OK".parse().unwrap(),
            year: "2024".parse().unwrap(),
            thresholds: Thresholds::new(Decimal::from(250_000), Decimal::from(100_000)).unwrap(),
            vendors: VendorFilter::NetworkEquipment,
        };

        let report = state_year(&api, &request).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.fetched_records(), 0);
    }

    #[test]
    fn test_build_report_rejects_out_of_range_totals() {
        let max = "79228162514264337593543950335";
        let rows = vec![raw("A", "2024", "Cisco", max), raw("A", "2024", "Cisco", max)];
        let thresholds = Thresholds::new(Decimal::ZERO, Decimal::ZERO).unwrap();

        let err = build_report(rows, Grouping::Organization, thresholds, VendorFilter::All)
            .unwrap_err();
        assert!(matches!(err, crate::error::ErateError::AmountOverflow { .. }));
    }
}
