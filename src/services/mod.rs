//! Service interfaces the analysis pipeline depends on.

pub mod funding_api;
