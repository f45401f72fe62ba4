//! BigQuery adapter.

pub mod warehouse;

pub use warehouse::{BigQueryWarehouse, BIGQUERY_TOKEN_ENV};
