// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use std::path::PathBuf;
use std::time::Duration;

use crate::source::SourceKind;

use super::credentials::Credentials;
use super::types::{LensConfig, ResolvedConfig};

/// CLI options that can override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub source: Option<SourceKind>,
    pub csv_path: Option<String>,
    pub endpoint: Option<String>,
    pub app_id: Option<String>,
    pub api_key: Option<String>,
    pub window_hours: Option<u32>,
    pub timeout_ms: Option<u64>,
}

/// Default configuration values.
pub fn default_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Merge multiple configurations with precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI options
/// 2. Workspace config (.querylens.json)
/// 3. Global config (~/.querylens/config.json)
/// 4. Credentials file (appId;apiKey)
/// 5. Default values
///
/// When no layer names a source, the local source is chosen if a CSV path is
/// known and no credentials are, otherwise the remote source.
pub fn merge_config(
    global: Option<LensConfig>,
    workspace: Option<LensConfig>,
    credentials: Option<Credentials>,
    cli: CliOptions,
) -> ResolvedConfig {
    let mut result = default_config();
    let mut source = None;

    if let Some(creds) = credentials {
        result.app_id = Some(creds.app_id);
        result.api_key = Some(creds.api_key);
    }

    if let Some(config) = global {
        apply_lens_config(&mut result, &mut source, &config);
    }

    if let Some(config) = workspace {
        apply_lens_config(&mut result, &mut source, &config);
    }

    apply_cli_options(&mut result, &mut source, &cli);

    result.source = source.unwrap_or_else(|| {
        let has_credentials = result.app_id.is_some() && result.api_key.is_some();
        if result.csv_path.is_some() && !has_credentials {
            SourceKind::Local
        } else {
            SourceKind::Remote
        }
    });

    result
}

fn apply_lens_config(
    result: &mut ResolvedConfig,
    source: &mut Option<SourceKind>,
    config: &LensConfig,
) {
    if config.source.is_some() {
        *source = config.source;
    }

    if let Some(ref path) = config.csv_path {
        result.csv_path = Some(PathBuf::from(path));
    }

    if let Some(ref endpoint) = config.endpoint {
        result.endpoint = endpoint.clone();
    }

    if config.app_id.is_some() {
        result.app_id = config.app_id.clone();
    }

    if config.api_key.is_some() {
        result.api_key = config.api_key.clone();
    }

    if let Some(hours) = config.window_hours {
        result.window_hours = hours;
    }

    if let Some(timeout) = config.timeout_ms {
        result.timeout_ms = timeout;
    }

    if let Some(ttl) = config.cache_ttl_secs {
        result.cache_ttl = Duration::from_secs(ttl);
    }
}

fn apply_cli_options(
    result: &mut ResolvedConfig,
    source: &mut Option<SourceKind>,
    cli: &CliOptions,
) {
    if cli.source.is_some() {
        *source = cli.source;
    }

    if let Some(ref path) = cli.csv_path {
        result.csv_path = Some(PathBuf::from(path));
    }

    if let Some(ref endpoint) = cli.endpoint {
        result.endpoint = endpoint.clone();
    }

    if cli.app_id.is_some() {
        result.app_id = cli.app_id.clone();
    }

    if cli.api_key.is_some() {
        result.api_key = cli.api_key.clone();
    }

    if let Some(hours) = cli.window_hours {
        result.window_hours = hours;
    }

    if let Some(timeout) = cli.timeout_ms {
        result.timeout_ms = timeout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_defaults() {
        let config = merge_config(None, None, None, CliOptions::default());
        assert_eq!(config, ResolvedConfig::default());
    }

    #[test]
    fn test_merge_precedence() {
        let global = LensConfig {
            endpoint: Some("https://global.example".to_string()),
            window_hours: Some(48),
            ..Default::default()
        };
        let workspace = LensConfig {
            window_hours: Some(12),
            cache_ttl_secs: Some(60),
            ..Default::default()
        };
        let cli = CliOptions {
            window_hours: Some(6),
            ..Default::default()
        };

        let config = merge_config(Some(global), Some(workspace), None, cli);
        assert_eq!(config.endpoint, "https://global.example");
        assert_eq!(config.window_hours, 6);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_credentials_file_is_lowest_priority() {
        let workspace = LensConfig {
            api_key: Some("workspace-key".to_string()),
            ..Default::default()
        };
        let config = merge_config(
            None,
            Some(workspace),
            Some(Credentials::new("file-app", "file-key")),
            CliOptions::default(),
        );
        assert_eq!(config.app_id, Some("file-app".to_string()));
        assert_eq!(config.api_key, Some("workspace-key".to_string()));
        assert_eq!(config.source, SourceKind::Remote);
    }

    #[test]
    fn test_source_inferred_from_csv_path() {
        let workspace = LensConfig {
            csv_path: Some("usage.csv".to_string()),
            ..Default::default()
        };
        let config = merge_config(None, Some(workspace), None, CliOptions::default());
        assert_eq!(config.source, SourceKind::Local);
        assert_eq!(config.csv_path, Some(PathBuf::from("usage.csv")));
    }

    #[test]
    fn test_explicit_source_wins_over_inference() {
        let workspace = LensConfig {
            csv_path: Some("usage.csv".to_string()),
            ..Default::default()
        };
        let cli = CliOptions {
            source: Some(SourceKind::Remote),
            ..Default::default()
        };
        let config = merge_config(None, Some(workspace), None, cli);
        assert_eq!(config.source, SourceKind::Remote);
    }
}
