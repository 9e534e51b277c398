//! spacdn: shape CloudFront and Route 53 CloudFormation resources for
//! single-page-app deployments.
//!
//! The crate customizes a fixed baseline fragment (distributions, bucket
//! policy, DNS records, outputs) according to per-deployment settings,
//! then hands the shaped fragment back to the caller, optionally merged
//! into an existing template. Each build is synchronous and stateless:
//! the baseline is parsed fresh, shaped once, and returned.

pub mod app;
pub mod domain;
pub mod services;

use app::commands::{baseline as baseline_command, build as build_command};
use services::ResourceShaper;

pub use app::commands::build::{BuildOptions, OutputFormat};
pub use domain::config::{
    ApiOrigin, CdnConfig, DnsConfig, FailoverConfig, FailoverTarget, HostConfig, IdentityIds,
    LoggingConfig, SpaConfig, load_host_config, parse_host_config,
};
pub use domain::{AppError, DeployConfig, DeployContext, Template};

/// Shape a fresh copy of the baseline fragment for one deployment.
///
/// Validates `config`, then applies the shaping rules under `context`.
pub fn build_fragment(
    config: &DeployConfig,
    context: &DeployContext,
) -> Result<Template, AppError> {
    config.validate()?;

    let mut template = services::baseline::load_baseline()?;
    ResourceShaper::new(config, context).shape(&mut template)?;
    Ok(template)
}

/// Shape the baseline fragment and merge it into `base`, a caller-owned
/// template document.
pub fn build_artifacts(
    config: &DeployConfig,
    context: &DeployContext,
    base: &mut serde_yaml::Value,
) -> Result<(), AppError> {
    let fragment = build_fragment(config, context)?;
    services::merge::deep_merge(base, fragment.to_value()?);
    Ok(())
}

/// Run the build command against a host config file.
///
/// Returns the rendered document; also writes it when the options name an
/// output file.
pub fn build(options: &BuildOptions) -> Result<String, AppError> {
    build_command::execute(options)
}

/// Render the unshaped baseline fragment.
pub fn baseline(format: OutputFormat) -> Result<String, AppError> {
    baseline_command::execute(format)
}
