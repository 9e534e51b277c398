//! Build deployment artifacts: shape the baseline fragment and emit it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::domain::config::load_host_config;
use crate::domain::{AppError, DeployContext};
use crate::services::merge;

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Host config file (YAML) holding the `service` name and `custom` section.
    pub config: PathBuf,
    /// Deployment stage name.
    pub stage: String,
    /// Target region.
    pub region: String,
    /// Display name override; defaults to `{stage}-{service}` from the config file.
    pub service: Option<String>,
    /// Existing template to merge the shaped fragment into.
    pub merge_into: Option<PathBuf>,
    /// Emission format.
    pub format: OutputFormat,
    /// Write to a file instead of returning for stdout.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::invalid_config(format!(
                "Unknown output format '{other}': expected 'yaml' or 'json'"
            ))),
        }
    }
}

/// Shape the baseline with the configured settings and render the result.
///
/// Returns the rendered document; when `options.output` is set the
/// document is also written there.
pub fn execute(options: &BuildOptions) -> Result<String, AppError> {
    let host = load_host_config(&options.config)?;

    let service = match (&options.service, &host.service) {
        (Some(service), _) => service.clone(),
        (None, Some(service)) => format!("{}-{}", options.stage, service),
        (None, None) => {
            return Err(AppError::invalid_config(
                "service name missing: set `service:` in the config file or pass --service",
            ));
        }
    };
    let context = DeployContext::new(service, options.stage.clone(), options.region.clone());

    let fragment = crate::build_fragment(&host.custom, &context)?;

    let document = match &options.merge_into {
        Some(path) => {
            let mut base = load_template_value(path)?;
            merge::deep_merge(&mut base, fragment.to_value()?);
            base
        }
        None => fragment.to_value()?,
    };

    let rendered = render(&document, options.format)?;
    if let Some(path) = &options.output {
        fs::write(path, &rendered)?;
    }
    Ok(rendered)
}

pub(crate) fn render(document: &Value, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(document)?),
        OutputFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(document)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}

fn load_template_value(path: &Path) -> Result<Value, AppError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|err| AppError::ParseError {
        what: path.display().to_string(),
        details: err.to_string(),
    })
}
