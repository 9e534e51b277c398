//! The resource-shaping engine.
//!
//! Applies an ordered sequence of conditional mutations to the baseline
//! fragment: each rule reads specific configuration fields and either
//! fills in a document path, substitutes a computed default, or removes a
//! resource/output whose feature is disabled. The order is fixed because
//! later rules read state established by earlier ones: the origin
//! collapse decides which origin the default cache behavior targets, and
//! certificate presence decides the website URL protocol.

use serde_yaml::{Mapping, Value};

use crate::domain::config::{DeployConfig, FailoverTarget};
use crate::domain::template::{
    get_mapping_mut, get_sequence_mut, item_mapping_mut, remove_key, set_string, set_value,
};
use crate::domain::{AppError, DeployContext, Template};

const WEBSITE_DISTRIBUTION: &str = "WebsiteDistribution";
const REDIRECT_DISTRIBUTION: &str = "RedirectDistribution";
const ORIGIN_ACCESS_IDENTITY: &str = "WebsiteBucketOriginAccessIdentity";
const BUCKET_POLICY: &str = "WebsiteBucketBucketPolicy";
const WEBSITE_ENDPOINT_RECORD: &str = "WebsiteEndpointRecord";
const REDIRECT_ENDPOINT_RECORD: &str = "RedirectEndpointRecord";
const REDIRECT_BUCKET: &str = "RedirectBucket";

const OUTPUT_DISTRIBUTION_ID: &str = "WebsiteDistributionId";
const OUTPUT_DISTRIBUTION_URL: &str = "WebsiteDistributionURL";
const OUTPUT_WEBSITE_URL: &str = "WebsiteURL";

const WEBSITE_DC: &str = "Resources.WebsiteDistribution.Properties.DistributionConfig";
const REDIRECT_DC: &str = "Resources.RedirectDistribution.Properties.DistributionConfig";
const BUCKET_POLICY_PATH: &str = "Resources.WebsiteBucketBucketPolicy.Properties";
const REDIRECT_BUCKET_PATH: &str = "Resources.RedirectBucket.Properties";

/// Both distributions, paired with their error path for accessors.
const DISTRIBUTIONS: [(&str, &str); 2] =
    [(WEBSITE_DISTRIBUTION, WEBSITE_DC), (REDIRECT_DISTRIBUTION, REDIRECT_DC)];

/// Baseline origin order: website bucket, failover bucket, API.
const FAILOVER_ORIGIN_INDEX: usize = 1;
const API_ORIGIN_INDEX: usize = 2;

/// Sentinel carried by unset access-identity ids; never granted access.
const PLACEHOLDER: &str = "UNDEFINED";

/// Shapes one baseline fragment according to one configuration snapshot.
///
/// The configuration must already have passed
/// [`DeployConfig::validate`]; shaping itself never reads ambient state
/// and fails only on a malformed baseline.
pub struct ResourceShaper<'a> {
    config: &'a DeployConfig,
    context: &'a DeployContext,
}

impl<'a> ResourceShaper<'a> {
    pub fn new(config: &'a DeployConfig, context: &'a DeployContext) -> Self {
        Self { config, context }
    }

    /// Apply every shaping rule to `template` in order.
    ///
    /// A [`AppError::MissingStructure`] aborts the whole pass; the
    /// partially shaped fragment must not be used.
    pub fn shape(&self, template: &mut Template) -> Result<(), AppError> {
        if self.config.cdn.is_enabled(&self.context.stage) {
            self.name_origin_access_identity(template)?;
            self.apply_api_origin(template)?;
            self.apply_failover(template)?;
            self.apply_comments(template)?;
            self.apply_price_class(template)?;
            self.apply_logging(template)?;
            self.apply_certificate(template)?;
            self.apply_web_acl(template)?;
            self.apply_aliases(template)?;
            self.apply_endpoint_records(template)?;
        } else {
            remove_distribution_resources(template);
        }

        self.apply_redirect_bucket(template)
    }

    fn website_comment(&self) -> String {
        format!("Website: {} ({})", self.context.service, self.context.region)
    }

    fn redirect_comment(&self) -> String {
        format!("Redirect: {} ({})", self.context.service, self.context.region)
    }

    fn name_origin_access_identity(&self, template: &mut Template) -> Result<(), AppError> {
        let properties = template.resource_properties_mut(ORIGIN_ACCESS_IDENTITY)?;
        let identity_config = get_mapping_mut(
            properties,
            "CloudFrontOriginAccessIdentityConfig",
            "Resources.WebsiteBucketOriginAccessIdentity.Properties",
        )?;
        set_string(identity_config, "Comment", self.website_comment());
        Ok(())
    }

    /// Point the API origin at the configured endpoint, or drop the API
    /// origin and its cache behavior when no API is configured.
    fn apply_api_origin(&self, template: &mut Template) -> Result<(), AppError> {
        let dc = distribution_config_mut(template, WEBSITE_DISTRIBUTION)?;

        match &self.config.cdn.api {
            Some(api) => {
                let origins = get_sequence_mut(dc, "Origins", WEBSITE_DC)?;
                let api_origin = item_mapping_mut(
                    origins,
                    API_ORIGIN_INDEX,
                    &format!("{WEBSITE_DC}.Origins"),
                )?;
                set_string(api_origin, "DomainName", api.domain_name.as_str());
                match &api.origin_path {
                    Some(path) => set_string(api_origin, "OriginPath", path.as_str()),
                    None => remove_key(api_origin, "OriginPath"),
                }

                let behaviors = get_sequence_mut(dc, "CacheBehaviors", WEBSITE_DC)?;
                let behavior =
                    item_mapping_mut(behaviors, 0, &format!("{WEBSITE_DC}.CacheBehaviors"))?;
                set_string(behavior, "PathPattern", api.path_pattern.as_str());
                let forwarded = get_mapping_mut(
                    behavior,
                    "ForwardedValues",
                    &format!("{WEBSITE_DC}.CacheBehaviors[0]"),
                )?;
                set_value(forwarded, "Headers", string_sequence(&api.headers));
            }
            None => {
                let origins = get_sequence_mut(dc, "Origins", WEBSITE_DC)?;
                origins.truncate(API_ORIGIN_INDEX);
                remove_key(dc, "CacheBehaviors");
            }
        }
        Ok(())
    }

    /// Wire the secondary origin to the configured failover bucket, or
    /// collapse the origin list to the surviving origins and drop the
    /// origin group when no target matches the current region.
    fn apply_failover(&self, template: &mut Template) -> Result<(), AppError> {
        let failover = self.config.cdn.failover.as_ref();
        let target = failover.and_then(|config| config.target(&self.context.region));

        match target {
            Some(target) => {
                let dc = distribution_config_mut(template, WEBSITE_DISTRIBUTION)?;
                let origins = get_sequence_mut(dc, "Origins", WEBSITE_DC)?;
                let failover_origin = item_mapping_mut(
                    origins,
                    FAILOVER_ORIGIN_INDEX,
                    &format!("{WEBSITE_DC}.Origins"),
                )?;
                set_string(failover_origin, "DomainName", target.bucket_domain_name.as_str());

                if let Some(criteria) = failover.and_then(|config| config.criteria.as_ref()) {
                    let status_codes = failover_status_codes_mut(dc)?;
                    set_value(
                        status_codes,
                        "Items",
                        Value::Sequence(
                            criteria.iter().map(|code| Value::from(u64::from(*code))).collect(),
                        ),
                    );
                    set_value(status_codes, "Quantity", Value::from(criteria.len() as u64));
                }

                self.grant_failover_identities(template, target)
            }
            None => {
                let dc = distribution_config_mut(template, WEBSITE_DISTRIBUTION)?;
                let origins = get_sequence_mut(dc, "Origins", WEBSITE_DC)?;
                if origins.len() > API_ORIGIN_INDEX {
                    origins.remove(FAILOVER_ORIGIN_INDEX);
                } else {
                    origins.truncate(1);
                }
                let first = item_mapping_mut(origins, 0, &format!("{WEBSITE_DC}.Origins"))?;
                let first_id = first
                    .get("Id")
                    .cloned()
                    .ok_or_else(|| AppError::missing(format!("{WEBSITE_DC}.Origins[0].Id")))?;

                remove_key(dc, "OriginGroups");
                let behavior = get_mapping_mut(dc, "DefaultCacheBehavior", WEBSITE_DC)?;
                set_value(behavior, "TargetOriginId", first_id);
                Ok(())
            }
        }
    }

    /// Grant the failover access identities read access in both bucket
    /// policy statements, as partition-qualified principal ARNs.
    fn grant_failover_identities(
        &self,
        template: &mut Template,
        target: &FailoverTarget,
    ) -> Result<(), AppError> {
        let principals: Vec<Value> = target
            .origin_access_identity_id
            .values()
            .into_iter()
            .filter(|id| *id != PLACEHOLDER)
            .map(|id| {
                Value::String(format!(
                    "arn:{}:iam::cloudfront:user/CloudFront Origin Access Identity {}",
                    self.config.partition, id
                ))
            })
            .collect();

        let properties = template.resource_properties_mut(BUCKET_POLICY)?;
        let document = get_mapping_mut(properties, "PolicyDocument", BUCKET_POLICY_PATH)?;
        let statements = get_sequence_mut(
            document,
            "Statement",
            &format!("{BUCKET_POLICY_PATH}.PolicyDocument"),
        )?;
        for index in 0..2 {
            let statement_path = format!("{BUCKET_POLICY_PATH}.PolicyDocument.Statement");
            let statement = item_mapping_mut(statements, index, &statement_path)?;
            let principal =
                get_mapping_mut(statement, "Principal", &format!("{statement_path}[{index}]"))?;
            let aws = get_sequence_mut(
                principal,
                "AWS",
                &format!("{statement_path}[{index}].Principal"),
            )?;
            aws.extend(principals.iter().cloned());
        }
        Ok(())
    }

    fn apply_comments(&self, template: &mut Template) -> Result<(), AppError> {
        let dc = distribution_config_mut(template, WEBSITE_DISTRIBUTION)?;
        set_string(dc, "Comment", self.website_comment());

        let dc = distribution_config_mut(template, REDIRECT_DISTRIBUTION)?;
        set_string(dc, "Comment", self.redirect_comment());
        Ok(())
    }

    fn apply_price_class(&self, template: &mut Template) -> Result<(), AppError> {
        for (resource, _) in DISTRIBUTIONS {
            let dc = distribution_config_mut(template, resource)?;
            set_string(dc, "PriceClass", self.config.cdn.price_class.as_str());
        }
        Ok(())
    }

    fn apply_logging(&self, template: &mut Template) -> Result<(), AppError> {
        match &self.config.cdn.logging {
            Some(logging) => {
                let bucket = format!("{}.s3.amazonaws.com", logging.bucket_name);
                for (resource, path) in DISTRIBUTIONS {
                    let dc = distribution_config_mut(template, resource)?;
                    let block = get_mapping_mut(dc, "Logging", path)?;
                    set_string(block, "Bucket", bucket.as_str());
                    set_string(block, "Prefix", logging.prefix.as_str());
                }
            }
            None => {
                for (resource, _) in DISTRIBUTIONS {
                    let dc = distribution_config_mut(template, resource)?;
                    remove_key(dc, "Logging");
                }
            }
        }
        Ok(())
    }

    /// Attach the ACM certificate and force HTTPS, or fall back to the
    /// default CloudFront certificate by dropping the block.
    fn apply_certificate(&self, template: &mut Template) -> Result<(), AppError> {
        match &self.config.cdn.acm_certificate_arn {
            Some(arn) => {
                for (resource, path) in DISTRIBUTIONS {
                    let dc = distribution_config_mut(template, resource)?;
                    let certificate = get_mapping_mut(dc, "ViewerCertificate", path)?;
                    set_string(certificate, "AcmCertificateArn", arn.as_str());
                    if let Some(version) = &self.config.cdn.minimum_protocol_version {
                        set_string(certificate, "MinimumProtocolVersion", version.as_str());
                    }

                    let behavior = get_mapping_mut(dc, "DefaultCacheBehavior", path)?;
                    set_string(behavior, "ViewerProtocolPolicy", "redirect-to-https");
                }
            }
            None => {
                for (resource, _) in DISTRIBUTIONS {
                    let dc = distribution_config_mut(template, resource)?;
                    remove_key(dc, "ViewerCertificate");
                }
            }
        }
        Ok(())
    }

    fn apply_web_acl(&self, template: &mut Template) -> Result<(), AppError> {
        for (resource, _) in DISTRIBUTIONS {
            let dc = distribution_config_mut(template, resource)?;
            match &self.config.cdn.web_acl_id {
                Some(id) => set_string(dc, "WebACLId", id.as_str()),
                None => remove_key(dc, "WebACLId"),
            }
        }
        Ok(())
    }

    fn apply_aliases(&self, template: &mut Template) -> Result<(), AppError> {
        let dns = &self.config.dns;

        let dc = distribution_config_mut(template, WEBSITE_DISTRIBUTION)?;
        if let Some(aliases) = &self.config.cdn.aliases {
            set_value(dc, "Aliases", string_sequence(aliases));
        } else if let (Some(_), Some(endpoint)) = (&dns.hosted_zone_id, &dns.endpoint) {
            set_value(dc, "Aliases", Value::Sequence(vec![Value::String(endpoint.clone())]));
        } else {
            remove_key(dc, "Aliases");
        }

        let dc = distribution_config_mut(template, REDIRECT_DISTRIBUTION)?;
        if let (Some(_), Some(domain)) = (&dns.hosted_zone_id, &dns.domain_name) {
            set_value(dc, "Aliases", Value::Sequence(vec![Value::String(domain.clone())]));
        } else {
            remove_key(dc, "Aliases");
        }
        Ok(())
    }

    /// Fill in the endpoint records and the website URL output, dropping
    /// whichever of them lacks the DNS configuration it needs.
    fn apply_endpoint_records(&self, template: &mut Template) -> Result<(), AppError> {
        let dns = &self.config.dns;

        let Some(zone) = &dns.hosted_zone_id else {
            template.remove_resource(WEBSITE_ENDPOINT_RECORD);
            template.remove_resource(REDIRECT_ENDPOINT_RECORD);
            template.remove_output(OUTPUT_WEBSITE_URL);
            return Ok(());
        };

        let properties = template.resource_properties_mut(WEBSITE_ENDPOINT_RECORD)?;
        set_string(properties, "HostedZoneId", zone.as_str());
        let properties = template.resource_properties_mut(REDIRECT_ENDPOINT_RECORD)?;
        set_string(properties, "HostedZoneId", zone.as_str());

        match &dns.endpoint {
            Some(endpoint) => {
                let properties = template.resource_properties_mut(WEBSITE_ENDPOINT_RECORD)?;
                set_string(properties, "Name", format!("{endpoint}."));

                let protocol =
                    if self.config.cdn.acm_certificate_arn.is_some() { "https" } else { "http" };
                let output = template.output_mut(OUTPUT_WEBSITE_URL)?;
                set_string(output, "Value", format!("{protocol}://{endpoint}"));
            }
            None => {
                template.remove_resource(WEBSITE_ENDPOINT_RECORD);
                template.remove_output(OUTPUT_WEBSITE_URL);
            }
        }

        match &dns.domain_name {
            Some(domain) => {
                let properties = template.resource_properties_mut(REDIRECT_ENDPOINT_RECORD)?;
                set_string(properties, "Name", format!("{domain}."));
            }
            None => template.remove_resource(REDIRECT_ENDPOINT_RECORD),
        }
        Ok(())
    }

    /// Name the redirect bucket after the root domain, or drop the whole
    /// redirect chain when the toggle is off.
    fn apply_redirect_bucket(&self, template: &mut Template) -> Result<(), AppError> {
        if !self.config.spa.redirect {
            template.remove_resource(REDIRECT_BUCKET);
            template.remove_resource(REDIRECT_DISTRIBUTION);
            template.remove_resource(REDIRECT_ENDPOINT_RECORD);
            return Ok(());
        }

        let properties = template.resource_properties_mut(REDIRECT_BUCKET)?;
        if let Some(domain) = &self.config.dns.domain_name {
            set_string(properties, "BucketName", domain.as_str());
        }
        if let Some(endpoint) = &self.config.dns.endpoint {
            let website =
                get_mapping_mut(properties, "WebsiteConfiguration", REDIRECT_BUCKET_PATH)?;
            let redirect_target = get_mapping_mut(
                website,
                "RedirectAllRequestsTo",
                &format!("{REDIRECT_BUCKET_PATH}.WebsiteConfiguration"),
            )?;
            set_string(redirect_target, "HostName", endpoint.as_str());
        }
        Ok(())
    }
}

/// Drop every content-delivery resource and output. The buckets stay:
/// content can still be synced while no distribution serves it.
fn remove_distribution_resources(template: &mut Template) {
    template.remove_resource(BUCKET_POLICY);
    template.remove_resource(ORIGIN_ACCESS_IDENTITY);
    template.remove_resource(WEBSITE_DISTRIBUTION);
    template.remove_resource(WEBSITE_ENDPOINT_RECORD);
    template.remove_resource(REDIRECT_DISTRIBUTION);
    template.remove_resource(REDIRECT_ENDPOINT_RECORD);
    template.remove_output(OUTPUT_DISTRIBUTION_ID);
    template.remove_output(OUTPUT_DISTRIBUTION_URL);
    template.remove_output(OUTPUT_WEBSITE_URL);
}

fn distribution_config_mut<'t>(
    template: &'t mut Template,
    resource: &str,
) -> Result<&'t mut Mapping, AppError> {
    let properties = template.resource_properties_mut(resource)?;
    get_mapping_mut(properties, "DistributionConfig", &format!("Resources.{resource}.Properties"))
}

fn failover_status_codes_mut(dc: &mut Mapping) -> Result<&mut Mapping, AppError> {
    let groups = get_mapping_mut(dc, "OriginGroups", WEBSITE_DC)?;
    let items = get_sequence_mut(groups, "Items", &format!("{WEBSITE_DC}.OriginGroups"))?;
    let group = item_mapping_mut(items, 0, &format!("{WEBSITE_DC}.OriginGroups.Items"))?;
    let criteria =
        get_mapping_mut(group, "FailoverCriteria", &format!("{WEBSITE_DC}.OriginGroups.Items[0]"))?;
    get_mapping_mut(
        criteria,
        "StatusCodes",
        &format!("{WEBSITE_DC}.OriginGroups.Items[0].FailoverCriteria"),
    )
}

fn string_sequence(values: &[String]) -> Value {
    Value::Sequence(values.iter().cloned().map(Value::String).collect())
}
