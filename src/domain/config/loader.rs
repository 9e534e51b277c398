//! Deployment config loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DeployConfig;
use crate::domain::AppError;

/// The host config file as this tool reads it: the service name plus the
/// `custom` section. Every other host section passes through unread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    pub service: Option<String>,
    #[serde(default)]
    pub custom: DeployConfig,
}

/// Load and parse the host config file at `path`.
pub fn load_host_config(path: &Path) -> Result<HostConfig, AppError> {
    if !path.exists() {
        return Err(AppError::ConfigNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|err| AppError::ParseError {
        what: path.display().to_string(),
        details: err.to_string(),
    })
}

/// Parse host config content, for callers that already hold the text.
pub fn parse_host_config(content: &str) -> Result<HostConfig, AppError> {
    serde_yaml::from_str(content).map_err(|err| AppError::ParseError {
        what: "deployment config".to_string(),
        details: err.to_string(),
    })
}
