// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for querylens.
//!
//! Handles loading, merging, and validation of configuration from multiple sources:
//! - Credentials file: <local data dir>/MethodQueryUsageCodeLensProvider/config.txt
//! - Global config: ~/.querylens/config.json
//! - Workspace config: .querylens.json, .querylens.yaml or .querylens.yml
//! - CLI options: command-line arguments
//!
//! Configuration is merged with precedence (CLI > workspace > global > credentials > defaults).

mod credentials;
mod loader;
mod merger;
mod types;

pub use credentials::{
    get_credentials_dir, get_credentials_path, load_credentials, load_credentials_from,
    save_credentials, save_credentials_in, Credentials, CREDENTIALS_DIR, CREDENTIALS_FILE,
};

pub use loader::{
    find_workspace_root, get_example_config, get_global_config_dir, get_global_config_path,
    init_config, load_config_file, load_global_config, load_workspace_config,
    save_workspace_config, CONFIG_FILES, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};

pub use merger::{default_config, merge_config, CliOptions};

pub use types::{LensConfig, ResolvedConfig, DEFAULT_CACHE_TTL_SECS};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a workspace.
///
/// This is the main entry point for configuration loading.
/// A malformed credentials file is logged and ignored so that explicit
/// settings can still take over.
pub fn load_config(
    workspace_root: &Path,
    cli_options: CliOptions,
) -> Result<ResolvedConfig, ConfigError> {
    let credentials = load_credentials().unwrap_or_else(|e| {
        tracing::warn!("Ignoring credentials file: {}", e);
        None
    });
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;

    Ok(merge_config(global, workspace, credentials, cli_options))
}
