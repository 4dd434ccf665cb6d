//! Error types shared by the query tools.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ErateError>;

/// Coarse failure category, used to pick the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Transport,
    Parse,
    Io,
}

/// Errors that can end a query run.
#[derive(Error, Debug)]
pub enum ErateError {
    /// Bad CLI input or configuration value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Network failure, timeout, or client construction failure
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("USAC API returned {status} for {url}: {body}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// Pagination hit the page cap before the result set was exhausted
    #[error(
        "stopped after {pages} pages ({records} records) without reaching the end of the results; narrow the query or raise USAC_MAX_PAGES"
    )]
    PageLimit { pages: usize, records: usize },

    /// Response body was not the expected JSON shape
    #[error("unexpected API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Summing line-item costs left the representable decimal range
    #[error("cost total for {context} is out of range")]
    AmountOverflow { context: String },

    /// Failed to write an output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write a CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ErateError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ErateError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErateError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ErateError::Transport(_) | ErateError::HttpStatus { .. } | ErateError::PageLimit { .. } => {
                ErrorKind::Transport
            }
            ErateError::Parse(_) | ErateError::AmountOverflow { .. } => ErrorKind::Parse,
            ErateError::Io(_) | ErateError::Csv(_) => ErrorKind::Io,
        }
    }

    /// Exit code reported by the binaries. 2 matches clap's usage errors.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::InvalidArgument => 2,
            ErrorKind::Transport => 3,
            ErrorKind::Parse => 4,
            ErrorKind::Io => 5,
        }
    }
}

/// Maps an error bubbled up through `anyhow` to a process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ErateError>())
        .map_or(1, ErateError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_fetch_failures_as_transport() {
        let err = ErateError::HttpStatus {
            status: StatusCode::BAD_GATEWAY,
            url: "https://example.test".to_string(),
            body: String::new(),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = ErateError::PageLimit {
            pages: 3,
            records: 30,
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_parse_error_exit_code() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = ErateError::from(json_err);
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_transport_message_leaves_detail_to_source() {
        let reqwest_err = reqwest::blocking::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let detail = reqwest_err.to_string();
        let err = anyhow::Error::from(ErateError::from(reqwest_err));

        assert_eq!(err.to_string(), "request failed");
        assert_eq!(format!("{err:#}").matches(detail.as_str()).count(), 1);
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_amount_overflow_is_parse_failure() {
        let err = ErateError::AmountOverflow {
            context: "organization 'A'".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_through_anyhow_context() {
        let err = anyhow::Error::from(ErateError::invalid("bad state"))
            .context("while validating arguments");
        assert_eq!(exit_code(&err), 2);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&other), 1);
    }
}
