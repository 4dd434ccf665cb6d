mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{ErateError, Result};
use reqwest::Url;
use tracing::debug;

/// Longest slice of an error body kept in [`ErateError::HttpStatus`].
const MAX_ERROR_BODY: usize = 500;

/// Issues a GET and returns the body of a 2xx response.
///
/// # Errors
///
/// [`ErateError::Transport`] when the request cannot be completed and
/// [`ErateError::HttpStatus`] for any non-2xx answer.
pub fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: Url) -> Result<Vec<u8>> {
    let req = reqwest::blocking::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req)?;
    let status = resp.status();
    if !status.is_success() {
        let body: String = resp
            .text()
            .unwrap_or_default()
            .chars()
            .take(MAX_ERROR_BODY)
            .collect();
        return Err(ErateError::HttpStatus {
            status,
            url: url.to_string(),
            body,
        });
    }

    let bytes = resp.bytes()?.to_vec();
    debug!(bytes = bytes.len(), "Response body received");
    Ok(bytes)
}
