//! Line-item aggregation and reporting model.
//!
//! Raw records are converted into typed line items, narrowed to the tracked
//! network-equipment vendors, grouped by organization (and optionally
//! funding year), and wrapped in a [`types::Report`] that applies the
//! display thresholds without touching any totals.

pub mod aggregate;
pub mod analyzer;
pub mod search;
pub mod types;
pub mod utility;
pub mod vendor;
