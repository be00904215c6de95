// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Usage data sources.
//!
//! A source turns a method signature into a [`MetricsRecord`]. Two
//! implementations of the [`UsageSource`] trait are provided:
//!
//! - [`AnalyticsSource`] - queries a remote analytics API per lookup
//! - [`LocalUsageSource`] - reads a CSV export once and answers from memory
//!
//! Sources never fail a lookup. Misses and transport or parse failures come
//! back as an all-zero record whose `additional_info` carries the reason.
//!
//! ```rust,ignore
//! use querylens::config::ResolvedConfig;
//! use querylens::source::create_source;
//!
//! let source = create_source(&config)?;
//! let record = source.fetch("Shop.Orders.GetOrders(int id)").await;
//! ```

pub mod analytics;
pub mod columns;
pub mod local;

pub use analytics::{AnalyticsConfig, AnalyticsSource};
pub use columns::{Cell, ColumnMap};
pub use local::{LocalTable, LocalUsageSource};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;
use crate::error::ConfigError;
use crate::types::MetricsRecord;

/// Something that can answer usage lookups.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &str;

    /// Look up the record for a signature.
    ///
    /// Always yields a record. On failure the record is empty and its
    /// `additional_info` holds the error text.
    async fn fetch(&self, signature: &str) -> MetricsRecord;
}

/// Shared, dynamically dispatched source.
pub type BoxedSource = Arc<dyn UsageSource>;

/// Which source a lookup goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote analytics API
    Remote,
    /// Local CSV export
    Local,
}

/// Error type for parsing a source kind from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSourceKindError;

impl std::fmt::Display for ParseSourceKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid source kind (expected `remote` or `local`)")
    }
}

impl std::error::Error for ParseSourceKindError {}

impl std::str::FromStr for SourceKind {
    type Err = ParseSourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "analytics" => Ok(Self::Remote),
            "local" | "csv" => Ok(Self::Local),
            _ => Err(ParseSourceKindError),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Create the source selected by a resolved configuration.
///
/// # Errors
///
/// Returns an error when the selected source is missing settings
/// (credentials or CSV path) or the CSV file cannot be read.
pub fn create_source(config: &ResolvedConfig) -> Result<BoxedSource, ConfigError> {
    match config.source {
        SourceKind::Remote => {
            let source = AnalyticsSource::new(config.analytics_config()?)?;
            Ok(Arc::new(source))
        }
        SourceKind::Local => {
            let path = config
                .csv_path
                .as_ref()
                .ok_or_else(|| ConfigError::MissingField("csvPath".to_string()))?;
            let source = LocalUsageSource::open(path)?;
            Ok(Arc::new(source))
        }
    }
}
