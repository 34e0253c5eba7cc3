// crates/rollout-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Trigger payload builders shared by integration tests.
// Purpose: Keep trigger shapes consistent across test files.
// Dependencies: serde_json
// ============================================================================

//! Trigger payload builders shared by integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]

use serde_json::Value;
use serde_json::json;

/// Capture time used by every config-change fixture.
pub const CAPTURE_TIME: &str = "2016-02-17T01:36:34.043Z";
/// Unix milliseconds for [`CAPTURE_TIME`].
pub const CAPTURE_TIME_MS: i64 = 1_455_672_994_043;
/// Result token used by every config-change fixture.
pub const RESULT_TOKEN: &str = "token-abc";

/// Builds a configuration item carrying `tags` under `configuration.tags`.
pub fn configuration_item(tags: &Value) -> Value {
    json!({
        "resourceType": "AWS::EC2::Instance",
        "resourceId": "i-0123456789abcdef0",
        "configurationItemCaptureTime": CAPTURE_TIME,
        "configuration": { "tags": tags },
    })
}

/// Wraps a configuration item into a config-change trigger.
pub fn config_change_event_with_item(item: &Value) -> Value {
    json!({
        "configRuleName": "required-tags",
        "invokingEvent": json!({ "configurationItem": item }).to_string(),
        "resultToken": RESULT_TOKEN,
    })
}

/// Builds a config-change trigger with `tags` under `configuration.tags`.
pub fn config_change_event(tags: &Value) -> Value {
    config_change_event_with_item(&configuration_item(tags))
}

/// Builds a lifecycle-hook trigger.
pub fn hook_event(function_name: Option<&str>) -> Value {
    let mut event = json!({
        "DeploymentId": "d-ABC123",
        "LifecycleEventHookExecutionId": "hook-exec-1",
    });
    if let (Some(name), Some(map)) = (function_name, event.as_object_mut()) {
        map.insert("FunctionName".to_string(), Value::from(name));
    }
    event
}
