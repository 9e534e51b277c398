//! Content-delivery configuration models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

pub const DEFAULT_PRICE_CLASS: &str = "PriceClass_100";
pub const DEFAULT_LOG_PREFIX: &str = "aws-cloudfront";
pub const DEFAULT_API_PATH_PATTERN: &str = "/api-*";

/// Content-delivery settings under `custom.cdn`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CdnConfig {
    /// Disable content delivery for every stage.
    pub disabled: Option<bool>,
    /// Allowlist of stages content delivery is enabled for.
    pub enabled: Option<Vec<String>>,
    /// API origin passthrough behind the distribution.
    pub api: Option<ApiOrigin>,
    /// Per-region origin failover targets.
    pub failover: Option<FailoverConfig>,
    /// Edge-location coverage. Defaults to North America and Europe.
    #[serde(default = "default_price_class")]
    pub price_class: String,
    /// Access logging for both distributions.
    pub logging: Option<LoggingConfig>,
    /// ACM certificate for custom-domain TLS.
    pub acm_certificate_arn: Option<String>,
    /// Minimum TLS protocol version, only read with a certificate.
    pub minimum_protocol_version: Option<String>,
    /// Web-application-firewall ACL attached to both distributions.
    #[serde(rename = "webACLId")]
    pub web_acl_id: Option<String>,
    /// Explicit alias list for the primary distribution.
    pub aliases: Option<Vec<String>>,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            disabled: None,
            enabled: None,
            api: None,
            failover: None,
            price_class: default_price_class(),
            logging: None,
            acm_certificate_arn: None,
            minimum_protocol_version: None,
            web_acl_id: None,
            aliases: None,
        }
    }
}

impl CdnConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.disabled.is_some() && self.enabled.is_some() {
            return Err(AppError::invalid_config(
                "cdn.disabled and cdn.enabled are mutually exclusive; configure one or the other",
            ));
        }
        Ok(())
    }

    /// Whether content delivery applies to `stage`.
    ///
    /// Unconfigured means enabled; an explicit `disabled: false` means
    /// enabled; an allowlist enables only the stages it names. Both set
    /// is rejected by [`CdnConfig::validate`]; the conjunction keeps this
    /// total.
    pub fn is_enabled(&self, stage: &str) -> bool {
        match (&self.disabled, &self.enabled) {
            (None, None) => true,
            (Some(disabled), None) => !disabled,
            (None, Some(stages)) => stages.iter().any(|s| s == stage),
            (Some(disabled), Some(stages)) => !disabled && stages.iter().any(|s| s == stage),
        }
    }
}

/// API origin passthrough settings under `custom.cdn.api`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiOrigin {
    /// Domain name of the API endpoint.
    pub domain_name: String,
    /// Path prefix stripped before forwarding to the origin.
    pub origin_path: Option<String>,
    /// Cache-behavior path pattern routed to the API origin.
    #[serde(default = "default_api_path_pattern")]
    pub path_pattern: String,
    /// Headers forwarded to the API origin.
    #[serde(default = "default_api_headers")]
    pub headers: Vec<String>,
}

/// Per-region failover settings under `custom.cdn.failover`.
///
/// The wire shape keys failover targets by region, with `criteria` as a
/// sibling of the region keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FailoverConfig {
    /// Response status codes that trigger failover to the secondary
    /// origin, replacing the baseline's default set.
    pub criteria: Option<Vec<u16>>,
    /// Failover target per deployment region.
    #[serde(flatten)]
    pub regions: BTreeMap<String, FailoverTarget>,
}

impl FailoverConfig {
    pub fn target(&self, region: &str) -> Option<&FailoverTarget> {
        self.regions.get(region)
    }
}

/// One region's failover target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FailoverTarget {
    /// Domain name of the bucket served when the primary origin fails.
    pub bucket_domain_name: String,
    /// Access identities granted read access to both buckets.
    #[serde(default)]
    pub origin_access_identity_id: IdentityIds,
}

/// Scalar-or-list wire form for origin access identity ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdentityIds {
    One(String),
    Many(Vec<String>),
}

impl Default for IdentityIds {
    fn default() -> Self {
        IdentityIds::Many(Vec::new())
    }
}

impl IdentityIds {
    pub fn values(&self) -> Vec<&str> {
        match self {
            IdentityIds::One(id) => vec![id.as_str()],
            IdentityIds::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Access-logging settings under `custom.cdn.logging`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggingConfig {
    /// Bucket receiving access logs, by name.
    pub bucket_name: String,
    /// Log object key prefix.
    #[serde(default = "default_log_prefix")]
    pub prefix: String,
}

fn default_price_class() -> String {
    DEFAULT_PRICE_CLASS.to_string()
}

fn default_log_prefix() -> String {
    DEFAULT_LOG_PREFIX.to_string()
}

fn default_api_path_pattern() -> String {
    DEFAULT_API_PATH_PATTERN.to_string()
}

fn default_api_headers() -> Vec<String> {
    ["Accept", "Authorization", "Referer", "Content-Type"]
        .into_iter()
        .map(String::from)
        .collect()
}
