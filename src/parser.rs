//! JSON parser for Socrata result pages.

use crate::error::Result;
use crate::record::RawLineItem;

/// Decodes one page of FRN line items.
///
/// # Errors
///
/// Returns [`ErateError::Parse`](crate::ErateError::Parse) if the body is
/// not a JSON array of objects with string-valued fields.
pub fn parse_page(bytes: &[u8]) -> Result<Vec<RawLineItem>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_empty_array() {
        let page = parse_page(b"[]").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_parse_ignores_unknown_columns() {
        let body = br#"[{"organization_name": "A", "funding_year": "2024", "frn_status": "Funded"}]"#;
        let page = parse_page(body).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].organization_name.as_deref(), Some("A"));
        assert_eq!(page[0].state, None);
    }

    #[test]
    fn test_parse_error_object_is_rejected() {
        let body = br#"{"error": true, "message": "query coordinator error"}"#;
        let err = parse_page(body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_parse_truncated_body() {
        assert!(parse_page(b"[{\"state\": \"OK\"").is_err());
    }
}
