use crate::error::{ErateError, Result};
use crate::fetch::client::HttpClient;
use reqwest::header::{HeaderName, HeaderValue};

/// Header Socrata reads application tokens from.
pub const APP_TOKEN_HEADER: &str = "X-App-Token";

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header name and value are validated once at construction, so
/// `execute` never has to fail on a malformed key.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| ErateError::invalid(format!("invalid header name '{header_name}': {e}")))?;
        let mut value = HeaderValue::from_str(key)
            .map_err(|e| ErateError::invalid(format!("invalid API key value: {e}")))?;
        value.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Socrata application token, which lifts the anonymous request throttle.
    pub fn app_token(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, APP_TOKEN_HEADER, token)
    }
}

impl<C: HttpClient> HttpClient for ApiKey<C> {
    fn execute(
        &self,
        mut req: reqwest::blocking::Request,
    ) -> reqwest::Result<reqwest::blocking::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req)
    }
}
