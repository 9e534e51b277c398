//! DNS routing configuration model.

use serde::{Deserialize, Serialize};

/// DNS settings under `custom.dns`. The section is shared with the host's
/// DNS tooling, so unknown keys are tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    /// Route 53 hosted zone the endpoint records are created in.
    pub hosted_zone_id: Option<String>,
    /// Fully-qualified website endpoint, e.g. `www.example.com`.
    pub endpoint: Option<String>,
    /// Root domain name the redirect serves, e.g. `example.com`.
    pub domain_name: Option<String>,
}
