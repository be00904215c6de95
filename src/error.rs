// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for querylens.
//!
//! Lookup errors never cross the public lookup boundary: adapters convert them
//! into a zero-valued [`MetricsRecord`](crate::types::MetricsRecord) whose
//! `additional_info` is the error's display string. The variants still exist as
//! real types so the internal fallible paths can use `?`.

use thiserror::Error;

/// Failure classes a lookup can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No tag matched the incoming signature.
    NotFound,
    /// Network/HTTP failure, non-success status, or timeout.
    TransportFailure,
    /// Malformed or empty tabular response.
    ParseFailure,
}

/// Errors that can occur while resolving a signature to a metrics record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no data found / partial match failed")]
    NotFound,

    #[error("API error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    #[error("API error: request timed out after {0}ms")]
    Timeout(u64),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No rows returned.")]
    EmptyResult,
}

impl LookupError {
    /// Create a transport error with status code.
    pub fn status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a transport error without status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: None,
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound => FailureKind::NotFound,
            Self::Transport { .. } | Self::Timeout(_) => FailureKind::TransportFailure,
            Self::Parse(_) | Self::EmptyResult => FailureKind::ParseFailure,
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display_is_status_text() {
        assert_eq!(
            LookupError::NotFound.to_string(),
            "no data found / partial match failed"
        );
        assert_eq!(
            LookupError::status("Forbidden", 403).to_string(),
            "API error: Forbidden"
        );
        assert_eq!(LookupError::EmptyResult.to_string(), "No rows returned.");
        assert_eq!(
            LookupError::Timeout(30000).to_string(),
            "API error: request timed out after 30000ms"
        );
    }

    #[test]
    fn test_lookup_error_kind() {
        assert_eq!(LookupError::NotFound.kind(), FailureKind::NotFound);
        assert_eq!(
            LookupError::transport("connection refused").kind(),
            FailureKind::TransportFailure
        );
        assert_eq!(LookupError::Timeout(10).kind(), FailureKind::TransportFailure);
        assert_eq!(
            LookupError::Parse("bad".to_string()).kind(),
            FailureKind::ParseFailure
        );
        assert_eq!(LookupError::EmptyResult.kind(), FailureKind::ParseFailure);
    }

    #[test]
    fn test_lookup_error_status_code() {
        match LookupError::status("Bad request", 400) {
            LookupError::Transport {
                message,
                status_code,
            } => {
                assert_eq!(message, "Bad request");
                assert_eq!(status_code, Some(400));
            }
            _ => panic!("Expected Transport"),
        }
    }

    #[test]
    fn test_lookup_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: LookupError = result.unwrap_err().into();
        assert!(matches!(err, LookupError::Parse(_)));
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::NotFound(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_config_error_from_yaml() {
        let result: std::result::Result<serde_yaml::Value, _> = serde_yaml::from_str("a: [b");
        let err: ConfigError = result.unwrap_err().into();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }
}
