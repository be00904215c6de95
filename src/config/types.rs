// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of workspace and resolved configuration,
//! supporting JSON and YAML formats.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::analytics::{
    AnalyticsConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS, DEFAULT_WINDOW_HOURS,
};
use crate::source::SourceKind;

/// Default cache lifetime in seconds (one hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Workspace configuration for querylens.
/// Can be defined in .querylens.json or .querylens.yaml in the project root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LensConfig {
    /// Data source to query (remote, local)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,

    /// Path of the local CSV export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<String>,

    /// Analytics API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Analytics application ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// Analytics API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Query window in hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_hours: Option<u32>,

    /// Request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// How long a looked-up record stays fresh, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

/// Fully resolved configuration with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub source: SourceKind,
    pub csv_path: Option<PathBuf>,
    pub endpoint: String,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub window_hours: u32,
    pub timeout_ms: u64,
    pub cache_ttl: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Remote,
            csv_path: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_id: None,
            api_key: None,
            window_hours: DEFAULT_WINDOW_HOURS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl ResolvedConfig {
    /// Check that the selected source has what it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            SourceKind::Remote => {
                self.analytics_config()?.validate()?;
            }
            SourceKind::Local => {
                if self.csv_path.is_none() {
                    return Err(ConfigError::MissingField("csvPath".to_string()));
                }
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeoutMs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Connection settings for the remote source.
    pub fn analytics_config(&self) -> Result<AnalyticsConfig, ConfigError> {
        let app_id = self
            .app_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("appId".to_string()))?;
        let api_key = self
            .api_key
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("apiKey".to_string()))?;

        Ok(AnalyticsConfig::new(app_id, api_key)
            .with_endpoint(self.endpoint.clone())
            .with_window_hours(self.window_hours)
            .with_timeout_ms(self.timeout_ms))
    }
}
