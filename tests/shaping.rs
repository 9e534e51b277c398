//! End-to-end shaping scenarios through the public library API.

use proptest::prelude::*;
use serde_yaml::Value;
use spacdn::{DeployConfig, DeployContext, Template};

fn context() -> DeployContext {
    DeployContext::new("production-photos", "production", "us-east-1")
}

/// Parse a `custom`-section snippet and shape a fresh baseline with it.
fn shape(custom: &str) -> Template {
    let config: DeployConfig = serde_yaml::from_str(custom).unwrap();
    spacdn::build_fragment(&config, &context()).unwrap()
}

fn distribution_config<'t>(template: &'t Template, resource: &str) -> &'t Value {
    &template.resources.get(resource).unwrap()["Properties"]["DistributionConfig"]
}

fn output_value<'t>(template: &'t Template, name: &str) -> &'t Value {
    &template.outputs.get(name).unwrap()["Value"]
}

#[test]
fn disabled_cdn_removes_distributions_and_outputs() {
    let template = shape("cdn:\n  disabled: true\n");

    for name in [
        "WebsiteDistribution",
        "RedirectDistribution",
        "WebsiteEndpointRecord",
        "RedirectEndpointRecord",
        "WebsiteBucketBucketPolicy",
        "WebsiteBucketOriginAccessIdentity",
    ] {
        assert!(!template.has_resource(name), "{name} should be removed");
    }
    for name in ["WebsiteDistributionId", "WebsiteDistributionURL", "WebsiteURL"] {
        assert!(!template.has_output(name), "{name} should be removed");
    }

    // The buckets stay so content can still be synced.
    assert!(template.has_resource("WebsiteBucket"));
    assert!(template.has_output("WebsiteBucketName"));
}

#[test]
fn allowlist_excluding_stage_disables_cdn() {
    let template = shape("cdn:\n  enabled: [staging, development]\n");
    assert!(!template.has_resource("WebsiteDistribution"));
}

#[test]
fn allowlist_including_stage_keeps_cdn() {
    let template = shape("cdn:\n  enabled: [production]\n");
    assert!(template.has_resource("WebsiteDistribution"));
}

#[test]
fn certificate_with_dns_yields_https_website_url() {
    let template = shape(
        r#"
cdn:
  acmCertificateArn: arn:aws:acm:us-east-1:123456789012:certificate/abc
dns:
  hostedZoneId: Z123
  endpoint: example.com
"#,
    );

    assert_eq!(output_value(&template, "WebsiteURL"), &Value::String("https://example.com".into()));

    let record = template.resources.get("WebsiteEndpointRecord").unwrap();
    assert_eq!(record["Properties"]["Name"], Value::String("example.com.".into()));
    assert_eq!(record["Properties"]["HostedZoneId"], Value::String("Z123".into()));

    let dc = distribution_config(&template, "WebsiteDistribution");
    assert_eq!(
        dc["ViewerCertificate"]["AcmCertificateArn"],
        Value::String("arn:aws:acm:us-east-1:123456789012:certificate/abc".into())
    );
    assert_eq!(
        dc["DefaultCacheBehavior"]["ViewerProtocolPolicy"],
        Value::String("redirect-to-https".into())
    );
    assert_eq!(dc["Aliases"], serde_yaml::from_str::<Value>("[example.com]").unwrap());
}

#[test]
fn no_certificate_yields_http_website_url_and_default_viewer_certificate() {
    let template = shape(
        r#"
dns:
  hostedZoneId: Z123
  endpoint: example.com
"#,
    );

    assert_eq!(output_value(&template, "WebsiteURL"), &Value::String("http://example.com".into()));

    let dc = distribution_config(&template, "WebsiteDistribution");
    assert!(dc.get("ViewerCertificate").is_none());
}

#[test]
fn minimum_protocol_version_is_applied_with_certificate() {
    let template = shape(
        r#"
cdn:
  acmCertificateArn: arn:aws:acm:us-east-1:123456789012:certificate/abc
  minimumProtocolVersion: TLSv1.2_2019
"#,
    );

    let dc = distribution_config(&template, "WebsiteDistribution");
    assert_eq!(
        dc["ViewerCertificate"]["MinimumProtocolVersion"],
        Value::String("TLSv1.2_2019".into())
    );
}

#[test]
fn redirect_disabled_removes_redirect_chain() {
    let template = shape(
        r#"
spa:
  redirect: false
dns:
  hostedZoneId: Z123
  endpoint: www.example.com
  domainName: example.com
"#,
    );

    assert!(!template.has_resource("RedirectBucket"));
    assert!(!template.has_resource("RedirectDistribution"));
    assert!(!template.has_resource("RedirectEndpointRecord"));
}

#[test]
fn redirect_enabled_names_bucket_and_record() {
    let template = shape(
        r#"
spa:
  redirect: true
dns:
  hostedZoneId: Z123
  endpoint: www.example.com
  domainName: example.com
"#,
    );

    let bucket = template.resources.get("RedirectBucket").unwrap();
    assert_eq!(bucket["Properties"]["BucketName"], Value::String("example.com".into()));
    assert_eq!(
        bucket["Properties"]["WebsiteConfiguration"]["RedirectAllRequestsTo"]["HostName"],
        Value::String("www.example.com".into())
    );

    let record = template.resources.get("RedirectEndpointRecord").unwrap();
    assert_eq!(record["Properties"]["Name"], Value::String("example.com.".into()));

    let dc = distribution_config(&template, "RedirectDistribution");
    assert_eq!(dc["Aliases"], serde_yaml::from_str::<Value>("[example.com]").unwrap());
}

#[test]
fn failover_target_wires_secondary_origin_and_policy() {
    let template = shape(
        r#"
cdn:
  failover:
    us-east-1:
      bucketDomainName: b.s3.eu-west-1.amazonaws.com
      originAccessIdentityId: ABC
spa:
  redirect: false
"#,
    );

    let dc = distribution_config(&template, "WebsiteDistribution");
    let origins = dc["Origins"].as_sequence().unwrap();
    assert_eq!(origins.len(), 2);
    assert_eq!(origins[1]["DomainName"], Value::String("b.s3.eu-west-1.amazonaws.com".into()));
    assert!(dc.get("OriginGroups").is_some());

    let policy = template.resources.get("WebsiteBucketBucketPolicy").unwrap();
    let statements = policy["Properties"]["PolicyDocument"]["Statement"].as_sequence().unwrap();
    assert_eq!(statements.len(), 2);
    for statement in statements {
        let principals = statement["Principal"]["AWS"].as_sequence().unwrap();
        assert!(principals.iter().filter_map(Value::as_str).any(|arn| {
            arn == "arn:aws:iam::cloudfront:user/CloudFront Origin Access Identity ABC"
        }));
    }
}

#[test]
fn failover_for_another_region_collapses_to_primary_origin() {
    let template = shape(
        r#"
cdn:
  failover:
    eu-west-1:
      bucketDomainName: b.s3.eu-west-1.amazonaws.com
      originAccessIdentityId: ABC
"#,
    );

    let dc = distribution_config(&template, "WebsiteDistribution");
    let origins = dc["Origins"].as_sequence().unwrap();
    assert_eq!(origins.len(), 1);
    assert_eq!(origins[0]["Id"], Value::String("WebsiteBucketOrigin".into()));
    assert!(dc.get("OriginGroups").is_none());
    assert_eq!(
        dc["DefaultCacheBehavior"]["TargetOriginId"],
        Value::String("WebsiteBucketOrigin".into())
    );
}

#[test]
fn logging_config_fills_bucket_and_default_prefix() {
    let template = shape(
        r#"
cdn:
  logging:
    bucketName: logs
spa:
  redirect: true
"#,
    );

    for resource in ["WebsiteDistribution", "RedirectDistribution"] {
        let dc = distribution_config(&template, resource);
        assert_eq!(dc["Logging"]["Bucket"], Value::String("logs.s3.amazonaws.com".into()));
        assert_eq!(dc["Logging"]["Prefix"], Value::String("aws-cloudfront".into()));
    }
}

#[test]
fn absent_logging_removes_the_block() {
    let template = shape("spa:\n  redirect: true\n");

    for resource in ["WebsiteDistribution", "RedirectDistribution"] {
        let dc = distribution_config(&template, resource);
        assert!(dc.get("Logging").is_none());
    }
}

#[test]
fn web_acl_id_is_set_or_removed_on_both_distributions() {
    let template = shape("cdn:\n  webACLId: acl-123\nspa:\n  redirect: true\n");
    for resource in ["WebsiteDistribution", "RedirectDistribution"] {
        let dc = distribution_config(&template, resource);
        assert_eq!(dc["WebACLId"], Value::String("acl-123".into()));
    }

    let template = shape("spa:\n  redirect: true\n");
    for resource in ["WebsiteDistribution", "RedirectDistribution"] {
        let dc = distribution_config(&template, resource);
        assert!(dc.get("WebACLId").is_none());
    }
}

#[test]
fn explicit_aliases_win_over_dns_endpoint() {
    let template = shape(
        r#"
cdn:
  aliases: [cdn.example.com, www.example.com]
dns:
  hostedZoneId: Z123
  endpoint: example.com
"#,
    );

    let dc = distribution_config(&template, "WebsiteDistribution");
    assert_eq!(
        dc["Aliases"],
        serde_yaml::from_str::<Value>("[cdn.example.com, www.example.com]").unwrap()
    );
}

#[test]
fn no_hosted_zone_removes_records_and_website_url() {
    let template = shape("dns:\n  endpoint: example.com\n");

    assert!(!template.has_resource("WebsiteEndpointRecord"));
    assert!(!template.has_resource("RedirectEndpointRecord"));
    assert!(!template.has_output("WebsiteURL"));

    let dc = distribution_config(&template, "WebsiteDistribution");
    assert!(dc.get("Aliases").is_none());
}

#[test]
fn conflicting_enablement_is_rejected_before_shaping() {
    let config: DeployConfig =
        serde_yaml::from_str("cdn:\n  disabled: true\n  enabled: [production]\n").unwrap();
    let err = spacdn::build_fragment(&config, &context()).unwrap_err();
    assert!(err.to_string().contains("mutually exclusive"));
}

#[test]
fn build_artifacts_merges_into_existing_template() {
    let config = DeployConfig::default();
    let mut base: Value = serde_yaml::from_str(
        r#"
Resources:
  ExistingFunction:
    Type: AWS::Lambda::Function
Outputs: {}
"#,
    )
    .unwrap();

    spacdn::build_artifacts(&config, &context(), &mut base).unwrap();

    assert!(base["Resources"].get("ExistingFunction").is_some());
    assert!(base["Resources"].get("WebsiteDistribution").is_some());
    assert!(base["Outputs"].get("WebsiteBucketName").is_some());
}

fn config_strategy() -> impl Strategy<Value = DeployConfig> {
    (
        proptest::option::of(any::<bool>()),
        any::<bool>(),
        proptest::option::of(Just("Z123ABC".to_string())),
        proptest::option::of(Just("www.example.com".to_string())),
        proptest::option::of(Just("example.com".to_string())),
        proptest::option::of(Just(
            "arn:aws:acm:us-east-1:123456789012:certificate/abc".to_string(),
        )),
        proptest::option::of(Just("acl-123".to_string())),
    )
        .prop_map(|(disabled, redirect, zone, endpoint, domain, certificate, acl)| {
            let mut config = DeployConfig::default();
            config.cdn.disabled = disabled;
            config.cdn.acm_certificate_arn = certificate;
            config.cdn.web_acl_id = acl;
            config.dns.hosted_zone_id = zone;
            config.dns.endpoint = endpoint;
            config.dns.domain_name = domain;
            config.spa.redirect = redirect;
            config
        })
}

proptest! {
    #[test]
    fn same_config_shapes_identical_fragments(config in config_strategy()) {
        let first = spacdn::build_fragment(&config, &context()).unwrap();
        let second = spacdn::build_fragment(&config, &context()).unwrap();
        prop_assert_eq!(first.to_value().unwrap(), second.to_value().unwrap());
    }

    #[test]
    fn disabled_cdn_never_leaves_a_distribution(config in config_strategy()) {
        let mut config = config;
        config.cdn.disabled = Some(true);
        let fragment = spacdn::build_fragment(&config, &context()).unwrap();
        prop_assert!(!fragment.has_resource("WebsiteDistribution"));
        prop_assert!(!fragment.has_output("WebsiteURL"));
    }
}
