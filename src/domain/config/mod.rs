//! Deployment configuration domain models.
//!
//! Every field is optional and independently defaulted: configuration
//! absence is never an error, it selects the documented default. Only a
//! contradictory configuration (both `cdn.disabled` and `cdn.enabled`
//! set) is rejected, by [`DeployConfig::validate`].

mod cdn;
mod dns;
mod loader;

pub use cdn::{ApiOrigin, CdnConfig, FailoverConfig, FailoverTarget, IdentityIds, LoggingConfig};
pub use dns::DnsConfig;
pub use loader::{HostConfig, load_host_config, parse_host_config};

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

pub const DEFAULT_PARTITION: &str = "aws";

/// The `custom` section of the host config that this tool reads.
///
/// The section is shared with other host plugins, so unknown keys are
/// tolerated here; the subsections this tool owns are strict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployConfig {
    /// Content-delivery settings.
    #[serde(default)]
    pub cdn: CdnConfig,
    /// DNS routing settings.
    #[serde(default)]
    pub dns: DnsConfig,
    /// Single-page-app settings (only the redirect toggle is read here).
    #[serde(default)]
    pub spa: SpaConfig,
    /// AWS partition used when formatting IAM principal ARNs.
    #[serde(default = "default_partition")]
    pub partition: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            cdn: CdnConfig::default(),
            dns: DnsConfig::default(),
            spa: SpaConfig::default(),
            partition: default_partition(),
        }
    }
}

impl DeployConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.cdn.validate()
    }
}

/// Single-page-app settings. The section carries other keys owned by the
/// host's SPA tooling; only `redirect` belongs to this tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpaConfig {
    /// Serve a root-domain redirect bucket and distribution.
    #[serde(default)]
    pub redirect: bool,
}

fn default_partition() -> String {
    DEFAULT_PARTITION.to_string()
}
