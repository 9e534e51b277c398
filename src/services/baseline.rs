//! Embedded baseline fragment.
//!
//! The fragment ships inside the binary and is parsed fresh for every
//! build; no state survives across invocations.

use crate::domain::{AppError, Template};

static BASELINE: &str = include_str!("../assets/resources.yml");

/// Parse a fresh copy of the embedded baseline fragment.
pub fn load_baseline() -> Result<Template, AppError> {
    parse_baseline(BASELINE)
}

fn parse_baseline(content: &str) -> Result<Template, AppError> {
    serde_yaml::from_str(content).map_err(|err| AppError::MalformedBaseline(err.to_string()))
}
