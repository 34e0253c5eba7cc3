//! Config defaults and validation tests for rollout-gate-config.
// crates/rollout-gate-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate default behavior and field-level invariants.
// Purpose: Ensure an empty config is valid and bad values fail closed.
// =============================================================================

use rollout_gate_config::PostTrafficCheckKind;
use rollout_gate_core::DEFAULT_TARGET_FUNCTION;
use rollout_gate_core::HealthCheckRequest;

mod common;

use common::assert_invalid;

type TestResult = Result<(), String>;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn defaults_match_gate_constants() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.compliance.requirement().keys() != ["Owner".to_string(), "Environment".to_string()] {
        return Err("default required tags should be Owner, Environment".to_string());
    }
    if config.pre_traffic.default_function().as_str() != DEFAULT_TARGET_FUNCTION {
        return Err("default function mismatch".to_string());
    }
    if config.pre_traffic.health_request() != HealthCheckRequest::default() {
        return Err("default health request mismatch".to_string());
    }
    if config.post_traffic.check != PostTrafficCheckKind::None {
        return Err("post-traffic check should default to none".to_string());
    }
    if !config.audit.enabled || !config.metrics.enabled {
        return Err("audit and metrics should default to enabled".to_string());
    }
    Ok(())
}

#[test]
fn sections_parse_from_toml() -> TestResult {
    let config = common::config_from_toml(
        r#"
[compliance]
required_tags = ["Team"]

[pre_traffic]
default_function = "orders-api"
health_path = "/ready"
http_method = "HEAD"

[post_traffic]
check = "health_probe"

[aws]
region = "eu-west-1"
endpoint = "http://localhost:4566"
allow_http = true

[audit]
path = "/var/log/rollout-gate/audit.jsonl"

[metrics]
namespace = "Deployments"
service = "orders"
"#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.post_traffic.check != PostTrafficCheckKind::HealthProbe {
        return Err("post_traffic.check should parse health_probe".to_string());
    }
    if config.pre_traffic.health_request().http_method != "HEAD" {
        return Err("http_method should be HEAD".to_string());
    }
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(common::config_from_toml("[compliance]\nrequired = [\"Owner\"]\n").is_err());
}

#[test]
fn blank_required_tag_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compliance.required_tags = vec!["Owner".to_string(), " ".to_string()];
    assert_invalid(config.validate(), "entries must be non-empty")
}

#[test]
fn duplicate_required_tag_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compliance.required_tags = vec!["Owner".to_string(), "Owner".to_string()];
    assert_invalid(config.validate(), "duplicate compliance.required_tags entry")
}

#[test]
fn empty_required_tags_are_allowed() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compliance.required_tags.clear();
    config.validate().map_err(|err| err.to_string())?;
    if !config.compliance.requirement().is_empty() {
        return Err("requirement should be empty".to_string());
    }
    Ok(())
}

#[test]
fn blank_default_function_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.pre_traffic.default_function = String::new();
    assert_invalid(config.validate(), "pre_traffic.default_function must be non-empty")
}

#[test]
fn relative_health_path_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.pre_traffic.health_path = "health".to_string();
    assert_invalid(config.validate(), "must start with /")
}

#[test]
fn unknown_http_method_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.pre_traffic.http_method = "get".to_string();
    assert_invalid(config.validate(), "pre_traffic.http_method must be one of")
}

#[test]
fn http_endpoint_requires_opt_in() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.aws.endpoint = Some("http://localhost:4566".to_string());
    assert_invalid(config.validate(), "without allow_http")?;
    config.aws.allow_http = true;
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn endpoint_without_scheme_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.aws.endpoint = Some("localhost:4566".to_string());
    assert_invalid(config.validate(), "aws.endpoint must include")
}

#[test]
fn blank_metrics_namespace_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.metrics.namespace = String::new();
    assert_invalid(config.validate(), "metrics.namespace must be non-empty")
}
