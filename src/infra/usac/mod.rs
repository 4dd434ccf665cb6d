//! USAC Open Data (Socrata) client.

mod client;
mod soql;

pub use client::UsacClient;
pub use soql::SoqlQuery;
