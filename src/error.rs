// src/error.rs

//! Unified error handling for the search index.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid query options or config values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote movie source failed
    #[error("Source error for {context}: {message}")]
    Source { context: String, message: String },

    /// Snapshot store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot failed its version or checksum check
    #[error("Corrupt snapshot '{name}': {reason}")]
    CorruptSnapshot { name: String, reason: String },
}

/// Coarse error category reported in result envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidOptions,
    SourceUnavailable,
    Storage,
    Internal,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a source error with context.
    pub fn remote(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a corrupt snapshot error.
    pub fn corrupt(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::CorruptSnapshot {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Map this error onto the category shown to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Config(_) => ErrorKind::InvalidOptions,
            Self::Http(_) | Self::Url(_) | Self::Source { .. } => ErrorKind::SourceUnavailable,
            Self::Io(_) | Self::Storage(_) | Self::CorruptSnapshot { .. } => ErrorKind::Storage,
            Self::Json(_) | Self::Toml(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            AppError::validation("limit must be > 0").kind(),
            ErrorKind::InvalidOptions
        );
        assert_eq!(
            AppError::remote("page 3", "timed out").kind(),
            ErrorKind::SourceUnavailable
        );
        assert_eq!(
            AppError::corrupt("movies", "checksum mismatch").kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = AppError::remote("page 7", "connection refused");
        assert_eq!(
            err.to_string(),
            "Source error for page 7: connection refused"
        );
    }
}
