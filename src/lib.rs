pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod logging;
pub mod output;
pub mod parser;
pub mod record;
pub mod services;
pub mod validate;

pub use error::{ErateError, ErrorKind, Result};
