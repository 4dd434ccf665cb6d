//! Client configuration read from the environment.
//!
//! Binaries call `dotenvy::dotenv()` first, so every key can also live in a
//! `.env` file next to the working directory.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{ErateError, Result};

pub const DEFAULT_BASE_URL: &str = "https://opendata.usac.org";
/// E-Rate Request for Discount on Services: FRN Line Items.
pub const FRN_LINE_ITEMS_DATASET: &str = "hbj5-2bpj";
pub const DEFAULT_PAGE_SIZE: usize = 10_000;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub dataset: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub timeout: Duration,
    pub app_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dataset: FRN_LINE_ITEMS_DATASET.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_token: None,
        }
    }
}

impl ClientConfig {
    /// Reads `USAC_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset or blank keys
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("USAC_API_URL") {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(dataset) = get("USAC_DATASET") {
            config.dataset = dataset.trim().to_string();
        }
        if let Some(raw) = get("USAC_PAGE_SIZE") {
            config.page_size = positive("USAC_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = get("USAC_MAX_PAGES") {
            config.max_pages = positive("USAC_MAX_PAGES", &raw)?;
        }
        if let Some(raw) = get("USAC_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(positive("USAC_TIMEOUT_SECS", &raw)?);
        }
        config.app_token = get("USAC_APP_TOKEN").map(|t| t.trim().to_string());

        Ok(config)
    }

    /// Socrata resource endpoint for the configured dataset.
    pub fn endpoint(&self) -> String {
        format!("{}/resource/{}.json", self.base_url, self.dataset)
    }
}

fn positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ErateError::invalid(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}
