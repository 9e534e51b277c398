use std::io;

use thiserror::Error;

/// Library-wide error type for spacdn operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Deployment configuration rejected by validation.
    #[error("Invalid deployment configuration: {0}")]
    InvalidConfig(String),

    /// Deployment config file missing at the given path.
    #[error("Deployment config not found: {0}")]
    ConfigNotFound(String),

    /// A document could not be parsed.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// The embedded baseline fragment is unusable.
    #[error("Malformed baseline fragment: {0}")]
    MalformedBaseline(String),

    /// The baseline fragment lacks a node a shaping rule must read or write.
    #[error("Baseline fragment is missing expected structure at '{path}'")]
    MissingStructure { path: String },

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub(crate) fn invalid_config<S: Into<String>>(message: S) -> Self {
        AppError::InvalidConfig(message.into())
    }

    pub(crate) fn missing<S: Into<String>>(path: S) -> Self {
        AppError::MissingStructure { path: path.into() }
    }
}
