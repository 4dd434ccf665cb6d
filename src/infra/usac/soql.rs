use reqwest::Url;

use crate::error::{ErateError, Result};
use crate::services::funding_api::{LineItemQuery, NameMatch, OrganizationSearch};

/// Socrata system row id; a stable ordering for offset paging.
const ROW_ID_ORDER: &str = ":id";

/// A SoQL request against a Socrata resource, minus the paging parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    pub where_clause: String,
    pub select: Option<String>,
    pub group: Option<String>,
    pub order: String,
}

impl SoqlQuery {
    pub fn line_items(query: &LineItemQuery) -> Self {
        let where_clause = match query {
            LineItemQuery::OrganizationHistory {
                organization,
                years,
                name_match,
            } => {
                let years = years
                    .clone()
                    .map(|y| quote(&y.to_string()))
                    .collect::<Vec<_>>()
                    .join(",");
                let name = match name_match {
                    NameMatch::Exact => {
                        format!("upper(organization_name)=upper({})", quote(organization))
                    }
                    NameMatch::Partial => format!(
                        "upper(organization_name) like upper({})",
                        quote(&format!("%{organization}%"))
                    ),
                };
                format!("form_version='Current' AND funding_year in ({years}) AND {name}")
            }
            LineItemQuery::StateYear { state, year } => format!(
                "funding_year={} AND state={} AND form_version='Current'",
                quote(&year.to_string()),
                quote(state.as_str())
            ),
        };

        Self {
            where_clause,
            select: None,
            group: None,
            order: ROW_ID_ORDER.to_string(),
        }
    }

    pub fn organization_search(search: &OrganizationSearch) -> Self {
        let mut where_clause = format!(
            "upper(organization_name) like upper({})",
            quote(&format!("%{}%", search.term))
        );
        if let Some(state) = &search.state {
            where_clause.push_str(&format!(" AND upper(state)={}", quote(state.as_str())));
        }

        let columns = "organization_name,state,funding_year".to_string();
        Self {
            where_clause,
            select: Some(columns.clone()),
            group: Some(columns.clone()),
            order: columns,
        }
    }

    /// Full request URL for one page.
    pub fn page_url(&self, endpoint: &str, limit: usize, offset: usize) -> Result<Url> {
        let mut params: Vec<(&str, String)> = Vec::with_capacity(6);
        if let Some(select) = &self.select {
            params.push(("$select", select.clone()));
        }
        params.push(("$where", self.where_clause.clone()));
        if let Some(group) = &self.group {
            params.push(("$group", group.clone()));
        }
        params.push(("$order", self.order.clone()));
        params.push(("$limit", limit.to_string()));
        params.push(("$offset", offset.to_string()));

        Url::parse_with_params(endpoint, &params)
            .map_err(|e| ErateError::invalid(format!("invalid USAC endpoint '{endpoint}': {e}")))
    }
}

/// Quotes a SoQL string literal, doubling embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote("ST. MARY'S"), "'ST. MARY''S'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_organization_history_exact() {
        let query = SoqlQuery::line_items(&LineItemQuery::OrganizationHistory {
            organization: "O'FALLON SD 90".to_string(),
            years: 2023..=2025,
            name_match: NameMatch::Exact,
        });
        assert_eq!(
            query.where_clause,
            "form_version='Current' AND funding_year in ('2023','2024','2025') AND upper(organization_name)=upper('O''FALLON SD 90')"
        );
        assert_eq!(query.order, ":id");
        assert!(query.select.is_none());
    }

    #[test]
    fn test_organization_history_partial() {
        let query = SoqlQuery::line_items(&LineItemQuery::OrganizationHistory {
            organization: "PIEDMONT".to_string(),
            years: 2024..=2024,
            name_match: NameMatch::Partial,
        });
        assert!(
            query
                .where_clause
                .ends_with("upper(organization_name) like upper('%PIEDMONT%')")
        );
    }

    #[test]
    fn test_state_year() {
        let query = SoqlQuery::line_items(&LineItemQuery::StateYear {
            state: "ok".parse().unwrap(),
            year: "2024".parse().unwrap(),
        });
        assert_eq!(
            query.where_clause,
            "funding_year='2024' AND state='OK' AND form_version='Current'"
        );
    }

    #[test]
    fn test_organization_search_groups_columns() {
        let query = SoqlQuery::organization_search(&OrganizationSearch {
            term: "PIEDMONT".to_string(),
            state: Some("ca".parse().unwrap()),
        });
        assert_eq!(
            query.where_clause,
            "upper(organization_name) like upper('%PIEDMONT%') AND upper(state)='CA'"
        );
        assert_eq!(query.group.as_deref(), Some("organization_name,state,funding_year"));
    }

    #[test]
    fn test_page_url_carries_paging() {
        let query = SoqlQuery::line_items(&LineItemQuery::StateYear {
            state: "TX".parse().unwrap(),
            year: "2022".parse().unwrap(),
        });
        let url = query
            .page_url("https://opendata.usac.org/resource/hbj5-2bpj.json", 100, 200)
            .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("$limit".to_string(), "100".to_string())));
        assert!(pairs.contains(&("$offset".to_string(), "200".to_string())));
        assert!(pairs.contains(&("$order".to_string(), ":id".to_string())));
        assert!(pairs.contains(&(
            "$where".to_string(),
            "funding_year='2022' AND state='TX' AND form_version='Current'".to_string()
        )));
    }

    #[test]
    fn test_page_url_rejects_bad_endpoint() {
        let query = SoqlQuery::line_items(&LineItemQuery::StateYear {
            state: "TX".parse().unwrap(),
            year: "2022".parse().unwrap(),
        });
        assert!(query.page_url("not a url", 10, 0).is_err());
    }
}
