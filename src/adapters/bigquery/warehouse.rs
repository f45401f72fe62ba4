//! BigQuery warehouse adapter.
//!
//! Synchronous query execution through the REST `jobs.query` endpoint.
//! Authentication is a bearer token (`warehouse.access_token` or the
//! `BIGQUERY_TOKEN` env var, e.g. from `gcloud auth print-access-token`);
//! the OAuth flow itself stays outside the crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::config::WarehouseConfig;
use crate::domain::models::session::Row;
use crate::domain::ports::warehouse::Warehouse;

/// Env var consulted when the config carries no access token.
pub const BIGQUERY_TOKEN_ENV: &str = "BIGQUERY_TOKEN";

/// `Warehouse` backed by the BigQuery v2 REST API.
#[derive(Debug)]
pub struct BigQueryWarehouse {
    base_url: String,
    project: String,
    timeout_ms: u64,
    token: String,
    client: reqwest::Client,
}

impl BigQueryWarehouse {
    /// Build the adapter, resolving the token up front so missing
    /// credentials fail at startup.
    pub fn new(config: &WarehouseConfig) -> AgentResult<Self> {
        let token = config
            .access_token
            .clone()
            .or_else(|| std::env::var(BIGQUERY_TOKEN_ENV).ok())
            .ok_or_else(|| {
                AgentError::Configuration(format!(
                    "warehouse token not set; set {BIGQUERY_TOKEN_ENV} or warehouse.access_token"
                ))
            })?;
        let client = reqwest::Client::builder()
            // Server-side timeout plus slack for transport.
            .timeout(Duration::from_millis(config.timeout_ms + 10_000))
            .build()
            .map_err(|e| AgentError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            project: config.project.clone(),
            timeout_ms: config.timeout_ms,
            token,
            client,
        })
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn execute(&self, sql: &str) -> AgentResult<Vec<Row>> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.project);
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            timeout_ms: self.timeout_ms,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Execution(format!("BigQuery request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Execution(format!(
                "BigQuery returned {status}: {}",
                extract_api_error(&body)
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Execution(format!("malformed BigQuery response: {e}")))?;

        rows_from_response(parsed)
    }
}

/// Pull `error.message` out of an API error body, falling back to the
/// raw body when it is not the documented shape.
fn extract_api_error(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Flatten the schema/rows representation into ordered row maps.
fn rows_from_response(response: QueryResponse) -> AgentResult<Vec<Row>> {
    if !response.job_complete {
        return Err(AgentError::Execution(
            "query did not complete within the server timeout".to_string(),
        ));
    }

    if let Some(errors) = response.errors {
        if let Some(first) = errors.first() {
            return Err(AgentError::Execution(first.message.clone()));
        }
    }

    let fields = response.schema.map(|s| s.fields).unwrap_or_default();
    let mut rows = Vec::new();
    for wire_row in response.rows.unwrap_or_default() {
        let mut row = Row::new();
        for (field, cell) in fields.iter().zip(wire_row.f) {
            row.insert(field.name.clone(), cell_to_value(&field.field_type, cell.v));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// BigQuery serializes every scalar as a JSON string; coerce numerics and
/// booleans back so downstream summaries read naturally.
fn cell_to_value(field_type: &str, cell: serde_json::Value) -> serde_json::Value {
    let serde_json::Value::String(text) = cell else {
        return cell;
    };
    match field_type {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map_or_else(|_| serde_json::Value::String(text), Into::into),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => text
            .parse::<f64>()
            .map_or_else(|_| serde_json::Value::String(text), Into::into),
        "BOOLEAN" | "BOOL" => match text.as_str() {
            "true" => serde_json::Value::Bool(true),
            "false" => serde_json::Value::Bool(false),
            _ => serde_json::Value::String(text),
        },
        _ => serde_json::Value::String(text),
    }
}

// -- BigQuery API request/response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<Schema>,
    rows: Option<Vec<WireRow>>,
    errors: Option<Vec<WireError>>,
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
