// crates/rollout-gate-core/tests/trigger.rs
// ============================================================================
// Module: Trigger Parsing Tests
// Description: Config-change and lifecycle-hook trigger parsing.
// Purpose: Ensure malformed triggers are rejected before evaluation.
// Dependencies: rollout-gate-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises both tag locations, both tag shapes, and the required-field
//! checks on each trigger kind.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use rollout_gate_core::ConfigChangeTrigger;
use rollout_gate_core::LifecycleHookTrigger;
use rollout_gate_core::TagShapeError;
use rollout_gate_core::TagSource;
use rollout_gate_core::TriggerError;
use serde_json::Value;
use serde_json::json;

use crate::common::CAPTURE_TIME;
use crate::common::CAPTURE_TIME_MS;
use crate::common::RESULT_TOKEN;
use crate::common::config_change_event;
use crate::common::config_change_event_with_item;
use crate::common::configuration_item;
use crate::common::hook_event;

// ============================================================================
// SECTION: Config-Change Triggers
// ============================================================================

#[test]
fn parses_configuration_tags_as_pairs() {
    let event = config_change_event(&json!([
        { "Key": "Owner", "Value": "alice" },
        { "key": "Environment", "value": "prod" },
    ]));
    let trigger = ConfigChangeTrigger::from_json(&event).unwrap();

    assert_eq!(trigger.rule_name.as_deref(), Some("required-tags"));
    assert_eq!(trigger.resource_type.as_str(), "AWS::EC2::Instance");
    assert_eq!(trigger.resource_id.as_str(), "i-0123456789abcdef0");
    assert_eq!(trigger.captured_at.unix_millis(), CAPTURE_TIME_MS);
    assert_eq!(trigger.result_token.expose(), RESULT_TOKEN);
    assert!(matches!(trigger.tags, TagSource::Pairs(ref tags) if tags.len() == 2));
    assert!(trigger.tags.keys().contains("Environment"));
}

#[test]
fn falls_back_to_item_level_tag_mapping() {
    let item = json!({
        "resourceType": "AWS::S3::Bucket",
        "resourceId": "logs",
        "configurationItemCaptureTime": CAPTURE_TIME,
        "configuration": { "name": "logs" },
        "tags": { "Owner": "bob" },
    });
    let trigger = ConfigChangeTrigger::from_json(&config_change_event_with_item(&item)).unwrap();
    assert!(matches!(trigger.tags, TagSource::Mapping(_)));
    assert!(trigger.tags.keys().contains("Owner"));
}

#[test]
fn configuration_tags_take_precedence_over_item_tags() {
    let mut item = configuration_item(&json!({ "Owner": "alice" }));
    item["tags"] = json!({ "Environment": "prod" });
    let trigger = ConfigChangeTrigger::from_json(&config_change_event_with_item(&item)).unwrap();
    let keys = trigger.tags.keys();
    assert!(keys.contains("Owner"));
    assert!(!keys.contains("Environment"));
}

#[test]
fn absent_tags_yield_empty_source() {
    let item = json!({
        "resourceType": "AWS::EC2::Instance",
        "resourceId": "i-1",
        "configurationItemCaptureTime": CAPTURE_TIME,
    });
    let trigger = ConfigChangeTrigger::from_json(&config_change_event_with_item(&item)).unwrap();
    assert!(trigger.tags.is_empty());
}

#[test]
fn rule_name_is_optional() {
    let mut event = config_change_event(&json!({}));
    event.as_object_mut().unwrap().remove("configRuleName");
    let trigger = ConfigChangeTrigger::from_json(&event).unwrap();
    assert!(trigger.rule_name.is_none());
}

#[test]
fn non_string_rule_name_is_treated_as_absent() {
    let mut event = config_change_event(&json!({}));
    event["configRuleName"] = json!({ "name": "required-tags" });
    let trigger = ConfigChangeTrigger::from_json(&event).unwrap();
    assert!(trigger.rule_name.is_none());
    assert_eq!(trigger.result_token.expose(), RESULT_TOKEN);
}

#[test]
fn missing_result_token_is_rejected() {
    let mut event = config_change_event(&json!({}));
    event.as_object_mut().unwrap().remove("resultToken");
    assert_eq!(
        ConfigChangeTrigger::from_json(&event).unwrap_err(),
        TriggerError::MissingField("resultToken")
    );
}

#[test]
fn invoking_event_must_be_json_text() {
    let mut event = config_change_event(&json!({}));
    event["invokingEvent"] = Value::from("{not json");
    assert!(matches!(
        ConfigChangeTrigger::from_json(&event).unwrap_err(),
        TriggerError::InvalidField { field: "invokingEvent", .. }
    ));

    event["invokingEvent"] = json!({ "configurationItem": {} });
    assert!(matches!(
        ConfigChangeTrigger::from_json(&event).unwrap_err(),
        TriggerError::InvalidField { field: "invokingEvent", .. }
    ));
}

#[test]
fn missing_configuration_item_is_rejected() {
    let event = json!({
        "invokingEvent": json!({ "messageType": "ScheduledNotification" }).to_string(),
        "resultToken": RESULT_TOKEN,
    });
    assert_eq!(
        ConfigChangeTrigger::from_json(&event).unwrap_err(),
        TriggerError::MissingField("configurationItem")
    );
}

#[test]
fn missing_resource_id_is_rejected() {
    let mut item = configuration_item(&json!({}));
    item.as_object_mut().unwrap().remove("resourceId");
    assert_eq!(
        ConfigChangeTrigger::from_json(&config_change_event_with_item(&item)).unwrap_err(),
        TriggerError::MissingField("resourceId")
    );
}

#[test]
fn unparsable_capture_time_is_rejected() {
    let mut item = configuration_item(&json!({}));
    item["configurationItemCaptureTime"] = Value::from("yesterday");
    assert!(matches!(
        ConfigChangeTrigger::from_json(&config_change_event_with_item(&item)).unwrap_err(),
        TriggerError::InvalidField { field: "configurationItemCaptureTime", .. }
    ));
}

#[test]
fn unsupported_tag_shape_is_rejected() {
    let event = config_change_event(&json!("Owner=alice"));
    assert_eq!(
        ConfigChangeTrigger::from_json(&event).unwrap_err(),
        TriggerError::Tags(TagShapeError::UnsupportedShape { found: "string" })
    );
}

#[test]
fn non_object_payload_is_rejected() {
    assert_eq!(
        ConfigChangeTrigger::from_json(&json!([1, 2])).unwrap_err(),
        TriggerError::NotAnObject
    );
}

// ============================================================================
// SECTION: Lifecycle-Hook Triggers
// ============================================================================

#[test]
fn parses_lifecycle_hook_identifiers() {
    let ctx = LifecycleHookTrigger::from_json(&hook_event(Some("api-handler-canary"))).unwrap();
    assert_eq!(ctx.deployment_id.as_str(), "d-ABC123");
    assert_eq!(ctx.hook_execution_id.as_str(), "hook-exec-1");
    assert_eq!(ctx.function_name.as_ref().map(|name| name.as_str()), Some("api-handler-canary"));
    assert!(ctx.payload.is_none());
}

#[test]
fn extra_lifecycle_fields_are_kept_as_payload() {
    let mut event = hook_event(None);
    event["Version"] = Value::from("7");
    let ctx = LifecycleHookTrigger::from_json(&event).unwrap();
    assert!(ctx.function_name.is_none());
    assert_eq!(ctx.payload.unwrap().get("Version"), Some(&Value::from("7")));
}

#[test]
fn missing_hook_execution_id_is_rejected() {
    let event = json!({ "DeploymentId": "d-1" });
    assert_eq!(
        LifecycleHookTrigger::from_json(&event).unwrap_err(),
        TriggerError::MissingField("LifecycleEventHookExecutionId")
    );
}

#[test]
fn blank_function_name_is_recorded_not_rejected() {
    let ctx = LifecycleHookTrigger::from_json(&hook_event(Some("  "))).unwrap();
    assert!(ctx.function_name.is_none());
    assert_eq!(ctx.function_name_error.as_deref(), Some("must be non-empty"));
    assert_eq!(ctx.deployment_id.as_str(), "d-ABC123");
}

#[test]
fn non_string_function_name_is_recorded_not_rejected() {
    let mut event = hook_event(None);
    event["FunctionName"] = json!(42);
    let ctx = LifecycleHookTrigger::from_json(&event).unwrap();
    assert!(ctx.function_name.is_none());
    assert_eq!(ctx.function_name_error.as_deref(), Some("must be a string"));
    assert!(ctx.payload.is_none());
}
