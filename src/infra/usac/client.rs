use tracing::{debug, info};

use super::soql::SoqlQuery;
use crate::config::ClientConfig;
use crate::error::{ErateError, Result};
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_page;
use crate::record::RawLineItem;
use crate::services::funding_api::{FundingApi, LineItemQuery, OrganizationSearch};

/// Paginating client for the USAC Open Data FRN line-item dataset.
pub struct UsacClient<C> {
    http: C,
    config: ClientConfig,
}

impl UsacClient<Box<dyn HttpClient>> {
    /// Builds the production client, attaching the app token when configured.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let basic = BasicClient::new(config.timeout)?;
        let http: Box<dyn HttpClient> = match config.app_token.as_deref() {
            Some(token) => Box::new(ApiKey::app_token(basic, token)?),
            None => Box::new(basic),
        };
        Ok(Self::new(http, config))
    }
}

impl<C: HttpClient> UsacClient<C> {
    pub fn new(http: C, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Requests pages until a short page arrives.
    ///
    /// Any failed page aborts the whole fetch; running out of the page
    /// budget is an error rather than a silently truncated result.
    fn fetch_all(&self, query: &SoqlQuery) -> Result<Vec<RawLineItem>> {
        let endpoint = self.config.endpoint();
        let page_size = self.config.page_size;
        let mut records = Vec::new();

        for page in 0..self.config.max_pages {
            let offset = page * page_size;
            let url = query.page_url(&endpoint, page_size, offset)?;
            debug!(page, offset, "Requesting page");

            let batch = parse_page(&fetch_bytes(&self.http, url)?)?;
            let received = batch.len();
            records.extend(batch);
            debug!(page, received, total = records.len(), "Page received");

            if received < page_size {
                info!(pages = page + 1, records = records.len(), "Fetched all pages");
                return Ok(records);
            }
        }

        Err(ErateError::PageLimit {
            pages: self.config.max_pages,
            records: records.len(),
        })
    }
}

impl<C: HttpClient> FundingApi for UsacClient<C> {
    #[tracing::instrument(skip(self, query), fields(query = %query.describe()))]
    fn line_items(&self, query: &LineItemQuery) -> Result<Vec<RawLineItem>> {
        self.fetch_all(&SoqlQuery::line_items(query))
    }

    #[tracing::instrument(skip(self, search), fields(term = %search.term))]
    fn organization_rows(&self, search: &OrganizationSearch) -> Result<Vec<RawLineItem>> {
        self.fetch_all(&SoqlQuery::organization_search(search))
    }
}
