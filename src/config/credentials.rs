// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Analytics credentials file.
//!
//! The editor settings page stores the app ID and API key as a single
//! `appId;apiKey` line in `<local data dir>/MethodQueryUsageCodeLensProvider/config.txt`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Directory under the local data dir holding the credentials file.
pub const CREDENTIALS_DIR: &str = "MethodQueryUsageCodeLensProvider";

/// Credentials file name.
pub const CREDENTIALS_FILE: &str = "config.txt";

/// App ID and API key for the analytics source.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Parse an `appId;apiKey` line. The split is on the first `;`.
    pub fn parse(line: &str) -> Result<Self, ConfigError> {
        let (app_id, api_key) = line.trim().split_once(';').ok_or_else(|| {
            ConfigError::InvalidFormat("expected `appId;apiKey`".to_string())
        })?;

        let app_id = app_id.trim();
        if app_id.is_empty() {
            return Err(ConfigError::MissingField("appId".to_string()));
        }

        Ok(Self::new(app_id, api_key.trim()))
    }

    /// Serialize back to the file format.
    pub fn to_line(&self) -> String {
        format!("{};{}", self.app_id, self.api_key)
    }
}

/// Directory holding the credentials file.
pub fn get_credentials_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(CREDENTIALS_DIR))
}

/// Full path of the credentials file.
pub fn get_credentials_path() -> Option<PathBuf> {
    get_credentials_dir().map(|dir| dir.join(CREDENTIALS_FILE))
}

/// Load credentials from the default location, if present.
pub fn load_credentials() -> Result<Option<Credentials>, ConfigError> {
    match get_credentials_path() {
        Some(path) => load_credentials_from(&path),
        None => Ok(None),
    }
}

/// Load credentials from a file. A missing file is `Ok(None)`.
pub fn load_credentials_from(path: &Path) -> Result<Option<Credentials>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Credentials::parse(&content).map(Some)
}

/// Save credentials to the default location.
pub fn save_credentials(credentials: &Credentials) -> Result<PathBuf, ConfigError> {
    let dir = get_credentials_dir()
        .ok_or_else(|| ConfigError::NotFound("local data directory".to_string()))?;
    save_credentials_in(&dir, credentials)
}

/// Save credentials into a directory, creating it if needed.
pub fn save_credentials_in(dir: &Path, credentials: &Credentials) -> Result<PathBuf, ConfigError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(CREDENTIALS_FILE);
    std::fs::write(&path, credentials.to_line())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_credentials() {
        let creds = Credentials::parse(" my-app ; secret;with;semicolons \n").unwrap();
        assert_eq!(creds.app_id, "my-app");
        assert_eq!(creds.api_key, "secret;with;semicolons");
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(matches!(
            Credentials::parse("no-separator"),
            Err(ConfigError::InvalidFormat(_))
        ));
        assert!(matches!(
            Credentials::parse(";key"),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = Credentials::new("app", "super-secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("app"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CREDENTIALS_DIR);
        let creds = Credentials::new("app-1", "key-1");

        let path = save_credentials_in(&dir, &creds).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "app-1;key-1");

        let loaded = load_credentials_from(&path).unwrap();
        assert_eq!(loaded, Some(creds));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let loaded = load_credentials_from(&temp.path().join("config.txt")).unwrap();
        assert!(loaded.is_none());
    }
}
