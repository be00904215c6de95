// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Remote usage source backed by an analytics query API.
//!
//! Each lookup runs one query against
//! `{endpoint}/v1/apps/{app_id}/query?query=...&timespan=...`, authenticated with
//! an `x-api-key` header. The query groups logged database calls by tag and
//! returns a single table whose column names match the record fields.
//!
//! # Response shape
//!
//! ```json
//! { "tables": [ { "name": "PrimaryResult",
//!                 "columns": [ { "name": "Tag", "type": "string" }, ... ],
//!                 "rows": [ [ "Shop.Orders.GetOrders", 120, ... ] ] } ] }
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{ConfigError, LookupError};
use crate::matcher::TagMatcher;
use crate::types::{MetricFamily, MetricsRecord, Stat};

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;

use super::columns::ColumnMap;
use super::UsageSource;

/// Default analytics API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.applicationinsights.io";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default query window in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Longest accepted query window (two years).
pub const MAX_WINDOW_HOURS: u32 = 24 * 730;

/// Most aggregated tags a query returns for client-side selection.
const CANDIDATE_LIMIT: usize = 50;

/// Event name the instrumented application logs per executed query.
const QUERY_EVENT: &str = "QueryExecuted";

/// Analytics response body.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    tables: Vec<QueryTable>,
}

#[derive(Debug, Deserialize)]
struct QueryTable {
    #[serde(default)]
    columns: Vec<QueryColumn>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct QueryColumn {
    name: String,
}

/// Analytics error body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Connection settings for [`AnalyticsSource`].
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub app_id: String,
    pub api_key: String,
    /// How far back the query looks.
    pub window_hours: u32,
    pub timeout_ms: u64,
}

impl AnalyticsConfig {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_id: app_id.into(),
            api_key: api_key.into(),
            window_hours: DEFAULT_WINDOW_HOURS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_window_hours(mut self, hours: u32) -> Self {
        self.window_hours = hours;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::MissingField("appId".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("apiKey".to_string()));
        }
        if self.window_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "windowHours".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(ConfigError::InvalidValue {
                field: "windowHours".to_string(),
                message: format!("must be at most {}", MAX_WINDOW_HOURS),
            });
        }
        Ok(())
    }
}

/// Usage source that queries the analytics API.
pub struct AnalyticsSource {
    client: Client,
    config: AnalyticsConfig,
}

impl AnalyticsSource {
    /// Create a source with its own HTTP client using the configured timeout.
    pub fn new(config: AnalyticsConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "timeoutMs".to_string(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Self::with_client(config, client)
    }

    /// Create a source sharing an existing client. The client's own timeout applies.
    pub fn with_client(config: AnalyticsConfig, client: Client) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// ISO-8601 duration for the query window, e.g. `PT24H`.
    pub fn timespan(&self) -> String {
        format!("PT{}H", self.config.window_hours)
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v1/apps/{}/query",
            self.config.endpoint.trim_end_matches('/'),
            self.config.app_id
        )
    }

    /// Query text for a tag.
    pub fn build_query(&self, tag: &str) -> String {
        build_query(tag)
    }

    /// Lookup that reports failures as errors.
    #[instrument(skip(self), fields(window_hours = self.config.window_hours))]
    pub async fn try_fetch(&self, signature: &str) -> Result<MetricsRecord, LookupError> {
        let matcher = TagMatcher::new(Some(signature));
        let tag = matcher.signature();
        if tag.is_empty() {
            return Err(LookupError::NotFound);
        }
        let query = build_query(tag);
        let timespan = self.timespan();

        debug!(tag, "Sending analytics query");

        let response = self
            .client
            .get(self.query_url())
            .header("x-api-key", &self.config.api_key)
            .query(&[("query", query.as_str()), ("timespan", timespan.as_str())])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(LookupError::status(
                    error_response.error.message,
                    status.as_u16(),
                ));
            }
            let reason = status.canonical_reason().unwrap_or("request failed");
            return Err(LookupError::status(
                format!("{} {}", status.as_u16(), reason),
                status.as_u16(),
            ));
        }

        let mut record = select_record(&matcher, parse_query_rows(&body)?);
        if record.tag.trim().is_empty() {
            record.tag = tag.to_string();
        }
        let since = Utc::now()
            .checked_sub_signed(chrono::Duration::hours(i64::from(self.config.window_hours)));
        record.additional_info = match since {
            Some(since) => format!(
                "(Analytics data, last {}h since {} for '{}')",
                self.config.window_hours,
                since.format("%Y-%m-%d %H:%M UTC"),
                tag
            ),
            None => format!(
                "(Analytics data, last {}h for '{}')",
                self.config.window_hours, tag
            ),
        };
        Ok(record)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.config.timeout_ms)
        } else {
            LookupError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl UsageSource for AnalyticsSource {
    fn name(&self) -> &str {
        "analytics"
    }

    async fn fetch(&self, signature: &str) -> MetricsRecord {
        let start = Instant::now();
        let result = self.try_fetch(signature).await;

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_fetch(self.name(), start.elapsed(), result.is_ok());
        #[cfg(not(feature = "telemetry"))]
        let _ = start;

        result.unwrap_or_else(|err| {
            warn!(signature, error = %err, "Analytics lookup failed");
            let matcher = TagMatcher::new(Some(signature));
            MetricsRecord::from_error(matcher.signature(), &err)
        })
    }
}

/// Quote a value as a KQL string literal.
fn kql_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn kql_aggregate(stat: Stat) -> &'static str {
    match stat {
        Stat::Min => "min",
        Stat::Max => "max",
        Stat::Avg => "avg",
        Stat::Total => "sum",
    }
}

/// Build the aggregation query for one tag.
///
/// The tag of each logged query is its text up to the first `(` or call-site
/// marker, mirroring [`derive_tag`](crate::matcher::derive_tag). Rows with a
/// blank tag are dropped; the rest match the requested tag by equality or suffix
/// in either direction. Exact matches sort first, then tags in order, so the
/// caller can apply the same exact-then-suffix priority as the local source.
pub fn build_query(tag: &str) -> String {
    let literal = kql_string(tag);
    let mut lines = vec![
        "customEvents".to_string(),
        format!("| where name == {}", kql_string(QUERY_EVENT)),
        "| extend QueryText = tostring(customDimensions[\"QueryText\"])".to_string(),
        "| extend Tag = trim(@\"\\s+\", extract(@\"(?s)^(.*?)(\\(|-- file:)\", 1, QueryText))"
            .to_string(),
        "| extend Tag = iif(isempty(Tag), trim(@\"\\s+\", QueryText), Tag)".to_string(),
        "| where isnotempty(Tag)".to_string(),
        format!(
            "| where Tag =~ {lit} or Tag endswith {lit} or {lit} endswith Tag",
            lit = literal
        ),
    ];

    for family in MetricFamily::ALL {
        lines.push(format!(
            "| extend {name} = tolong(customMeasurements[\"{name}\"])",
            name = family.as_str()
        ));
    }

    let mut aggregates = vec![
        "QueryCount = count()".to_string(),
        "UniqueUserCount = dcount(user_Id)".to_string(),
    ];
    for family in MetricFamily::ALL {
        for stat in Stat::ALL {
            aggregates.push(format!(
                "{family}_{stat} = {func}({family})",
                family = family.as_str(),
                stat = stat.as_str(),
                func = kql_aggregate(stat)
            ));
        }
    }
    lines.push(format!("| summarize {} by Tag", aggregates.join(", ")));
    lines.push(format!("| extend Rank = iif(Tag =~ {}, 0, 1)", literal));
    lines.push("| order by Rank asc, Tag asc".to_string());
    lines.push(format!("| take {}", CANDIDATE_LIMIT));

    lines.join("\n")
}

/// Parse every row of the first table of an analytics response.
pub fn parse_query_rows(body: &str) -> Result<Vec<MetricsRecord>, LookupError> {
    let response: QueryResponse = serde_json::from_str(body)?;
    let table = response
        .tables
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("response contained no tables".to_string()))?;

    if table.rows.is_empty() {
        return Err(LookupError::EmptyResult);
    }

    let columns = ColumnMap::from_names(table.columns.iter().map(|c| c.name.as_str()));
    Ok(table.rows.iter().map(|row| columns.populate(row)).collect())
}

/// Parse an analytics response into a record from the first row of the first table.
pub fn parse_query_response(body: &str) -> Result<MetricsRecord, LookupError> {
    parse_query_rows(body)?
        .into_iter()
        .next()
        .ok_or(LookupError::EmptyResult)
}

/// Pick the row the matcher prefers, or the first row when no row carries a
/// matching tag. `records` must not be empty.
fn select_record(matcher: &TagMatcher, mut records: Vec<MetricsRecord>) -> MetricsRecord {
    let index = {
        let tags: Vec<&str> = records.iter().map(|r| r.tag.as_str()).collect();
        matcher.find(&tags).map_or(0, |found| found.index)
    };
    records.swap_remove(index)
}
