//! FRN line-item records: the raw API shape and the typed value the
//! aggregation works on.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyzers::vendor;

/// One row of the FRN line-item dataset as returned by Socrata.
///
/// Socrata encodes every value as a JSON string and omits null columns, so
/// all fields are optional text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLineItem {
    pub application_number: Option<String>,
    pub funding_request_number: Option<String>,
    pub funding_year: Option<String>,
    pub state: Option<String>,
    pub ben: Option<String>,
    pub organization_name: Option<String>,
    pub applicant_type: Option<String>,
    pub form_version: Option<String>,
    pub form_471_product_name: Option<String>,
    pub form_471_manufacturer_name: Option<String>,
    pub model_of_equipment: Option<String>,
    pub one_time_quantity: Option<String>,
    pub pre_discount_extended_eligible_line_item_costs: Option<String>,
}

/// A single funded line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub organization: String,
    pub state: String,
    pub funding_year: Option<i32>,
    pub ben: String,
    pub application_number: String,
    pub funding_request_number: String,
    pub applicant_type: String,
    pub form_version: String,
    pub product: String,
    pub manufacturer: String,
    pub vendor: String,
    pub model: String,
    pub quantity: String,
    pub cost: Decimal,
}

impl LineItem {
    pub fn from_raw(raw: RawLineItem) -> Self {
        let text = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

        let manufacturer = text(raw.form_471_manufacturer_name);
        let vendor = vendor::standardize(&manufacturer)
            .map(str::to_string)
            .unwrap_or_else(|| manufacturer.clone());
        let funding_year = raw
            .funding_year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok());
        let cost = parse_cost(raw.pre_discount_extended_eligible_line_item_costs.as_deref());

        LineItem {
            organization: text(raw.organization_name),
            state: text(raw.state),
            funding_year,
            ben: text(raw.ben),
            application_number: text(raw.application_number),
            funding_request_number: text(raw.funding_request_number),
            applicant_type: text(raw.applicant_type),
            form_version: text(raw.form_version),
            product: text(raw.form_471_product_name),
            manufacturer,
            vendor,
            model: text(raw.model_of_equipment),
            quantity: text(raw.one_time_quantity),
            cost,
        }
    }

    /// Quantity when the record carries a meaningful one.
    pub fn quantity(&self) -> Option<&str> {
        match self.quantity.as_str() {
            "" | "0" => None,
            q => Some(q),
        }
    }
}

/// Parses the pre-discount eligible cost. Missing or unparseable values
/// count as zero.
pub fn parse_cost(raw: Option<&str>) -> Decimal {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Decimal::ZERO;
    };
    match Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
        Ok(cost) => cost,
        Err(e) => {
            warn!(value, error = %e, "Unparseable line item cost, counting as zero");
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost(Some("150000.50")), Decimal::new(15_000_050, 2));
        assert_eq!(parse_cost(Some(" 42 ")), Decimal::from(42));
        assert_eq!(parse_cost(Some("1.5e3")), Decimal::from(1500));
        assert_eq!(parse_cost(Some("")), Decimal::ZERO);
        assert_eq!(parse_cost(Some("n/a")), Decimal::ZERO);
        assert_eq!(parse_cost(None), Decimal::ZERO);
    }

    #[test]
    fn test_from_raw_standardizes_vendor() {
        let raw = RawLineItem {
            organization_name: Some(" TULSA PUBLIC SCHOOLS ".to_string()),
            funding_year: Some("2024".to_string()),
            form_471_manufacturer_name: Some("Cisco Meraki".to_string()),
            pre_discount_extended_eligible_line_item_costs: Some("1200.00".to_string()),
            ..Default::default()
        };

        let item = LineItem::from_raw(raw);
        assert_eq!(item.organization, "TULSA PUBLIC SCHOOLS");
        assert_eq!(item.funding_year, Some(2024));
        assert_eq!(item.manufacturer, "Cisco Meraki");
        assert_eq!(item.vendor, "Cisco");
        assert_eq!(item.cost, Decimal::new(120_000, 2));
    }

    #[test]
    fn test_from_raw_keeps_unknown_manufacturer() {
        let raw = RawLineItem {
            form_471_manufacturer_name: Some("Acme Cabling".to_string()),
            funding_year: Some("not a year".to_string()),
            ..Default::default()
        };

        let item = LineItem::from_raw(raw);
        assert_eq!(item.vendor, "Acme Cabling");
        assert_eq!(item.funding_year, None);
        assert_eq!(item.cost, Decimal::ZERO);
    }

    #[test]
    fn test_quantity_hides_zero() {
        let mut item = LineItem::from_raw(RawLineItem::default());
        assert_eq!(item.quantity(), None);
        item.quantity = "0".to_string();
        assert_eq!(item.quantity(), None);
        item.quantity = "12".to_string();
        assert_eq!(item.quantity(), Some("12"));
    }
}
