// crates/rollout-gate-core/src/runtime/trigger.rs
// ============================================================================
// Module: Trigger Parsing
// Description: Strict parsing of config-change and lifecycle-hook trigger payloads.
// Purpose: Fail loudly on malformed input before any report is attempted.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Triggers arrive as JSON objects. Config-change triggers nest the
//! configuration item inside a string-encoded `invokingEvent`; lifecycle-hook
//! triggers are flat. A missing or mistyped required field is a
//! [`TriggerError`]: the invocation aborts and reports nothing, rather than
//! submitting a default verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::CaptureTime;
use crate::core::DeploymentId;
use crate::core::FunctionName;
use crate::core::HookExecutionId;
use crate::core::LifecycleHookContext;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::core::ResultToken;
use crate::core::TagShapeError;
use crate::core::TagSource;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Config-change trigger: string-encoded invoking event.
const FIELD_INVOKING_EVENT: &str = "invokingEvent";
/// Config-change trigger: single-use result token.
const FIELD_RESULT_TOKEN: &str = "resultToken";
/// Config-change trigger: optional rule name.
const FIELD_RULE_NAME: &str = "configRuleName";
/// Invoking event: configuration item object.
const FIELD_CONFIGURATION_ITEM: &str = "configurationItem";
/// Configuration item: resource type.
const FIELD_RESOURCE_TYPE: &str = "resourceType";
/// Configuration item: resource identifier.
const FIELD_RESOURCE_ID: &str = "resourceId";
/// Configuration item: capture time.
const FIELD_CAPTURE_TIME: &str = "configurationItemCaptureTime";
/// Configuration item: resource-specific configuration.
const FIELD_CONFIGURATION: &str = "configuration";
/// Configuration or configuration item: tags.
const FIELD_TAGS: &str = "tags";
/// Lifecycle trigger: deployment identifier.
const FIELD_DEPLOYMENT_ID: &str = "DeploymentId";
/// Lifecycle trigger: hook execution identifier.
const FIELD_HOOK_EXECUTION_ID: &str = "LifecycleEventHookExecutionId";
/// Lifecycle trigger: optional target override.
const FIELD_FUNCTION_NAME: &str = "FunctionName";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed-input errors. Always fatal; no report is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// The trigger payload was not a JSON object.
    #[error("trigger payload must be a JSON object")]
    NotAnObject,
    /// A required field was absent or null.
    #[error("trigger field missing: {0}")]
    MissingField(&'static str),
    /// A field was present with the wrong type or an unusable value.
    #[error("trigger field {field} invalid: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Validation failure detail.
        reason: String,
    },
    /// The tag payload matched neither accepted shape.
    #[error("trigger tags invalid: {0}")]
    Tags(#[from] TagShapeError),
}

// ============================================================================
// SECTION: Config-Change Trigger
// ============================================================================

/// Parsed config-change notification.
#[derive(Debug)]
pub struct ConfigChangeTrigger {
    /// Rule name, when the trigger carries one as a string.
    pub rule_name: Option<String>,
    /// Evaluated resource type.
    pub resource_type: ResourceType,
    /// Evaluated resource identifier.
    pub resource_id: ResourceId,
    /// Resource tags in the shape delivered.
    pub tags: TagSource,
    /// Configuration item capture time.
    pub captured_at: CaptureTime,
    /// Single-use result token.
    pub result_token: ResultToken,
}

impl ConfigChangeTrigger {
    /// Parses a config-change trigger payload.
    ///
    /// Tags are read from `configuration.tags`; when that is absent the
    /// item-level `tags` mapping is used; when both are absent the tag set is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] when a required field is missing or malformed.
    pub fn from_json(event: &Value) -> Result<Self, TriggerError> {
        let event = event.as_object().ok_or(TriggerError::NotAnObject)?;
        let invoking_raw = required_str(event, FIELD_INVOKING_EVENT)?;
        let result_token = ResultToken::new(required_str(event, FIELD_RESULT_TOKEN)?);
        let rule_name =
            present(event, FIELD_RULE_NAME).and_then(Value::as_str).map(str::to_string);

        let invoking: Value =
            serde_json::from_str(invoking_raw).map_err(|err| TriggerError::InvalidField {
                field: FIELD_INVOKING_EVENT,
                reason: err.to_string(),
            })?;
        let invoking = invoking.as_object().ok_or_else(|| TriggerError::InvalidField {
            field: FIELD_INVOKING_EVENT,
            reason: "must encode a JSON object".to_string(),
        })?;
        let item = required_object(invoking, FIELD_CONFIGURATION_ITEM)?;

        let resource_type = ResourceType::new(required_str(item, FIELD_RESOURCE_TYPE)?);
        let resource_id = ResourceId::new(required_str(item, FIELD_RESOURCE_ID)?);
        let captured_raw = required_str(item, FIELD_CAPTURE_TIME)?;
        let captured_at =
            CaptureTime::parse_rfc3339(captured_raw).map_err(|err| TriggerError::InvalidField {
                field: FIELD_CAPTURE_TIME,
                reason: err.to_string(),
            })?;

        let configuration_tags = match item.get(FIELD_CONFIGURATION) {
            None | Some(Value::Null) => None,
            Some(Value::Object(configuration)) => present(configuration, FIELD_TAGS),
            Some(_) => {
                return Err(TriggerError::InvalidField {
                    field: FIELD_CONFIGURATION,
                    reason: "must be an object".to_string(),
                });
            }
        };
        let tags = match configuration_tags.or_else(|| present(item, FIELD_TAGS)) {
            Some(raw) => TagSource::from_json(raw)?,
            None => TagSource::default(),
        };

        Ok(Self {
            rule_name,
            resource_type,
            resource_id,
            tags,
            captured_at,
            result_token,
        })
    }
}

// ============================================================================
// SECTION: Lifecycle-Hook Trigger
// ============================================================================

/// Parser for lifecycle-hook triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleHookTrigger;

impl LifecycleHookTrigger {
    /// Parses a lifecycle-hook trigger into a hook context.
    ///
    /// Fields other than the identifiers and `FunctionName` are kept as the
    /// opaque invocation payload. A blank or non-string `FunctionName` is not a
    /// parse error: it is recorded on the context and fails the pre-traffic
    /// probe, while post-traffic ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] when a required identifier is missing or malformed.
    pub fn from_json(event: &Value) -> Result<LifecycleHookContext, TriggerError> {
        let event = event.as_object().ok_or(TriggerError::NotAnObject)?;
        let deployment_id = DeploymentId::new(required_str(event, FIELD_DEPLOYMENT_ID)?);
        let hook_execution_id =
            HookExecutionId::new(required_str(event, FIELD_HOOK_EXECUTION_ID)?);
        let (function_name, function_name_error) = match present(event, FIELD_FUNCTION_NAME) {
            None => (None, None),
            Some(Value::String(name)) if !name.trim().is_empty() => {
                (Some(FunctionName::new(name.as_str())), None)
            }
            Some(Value::String(_)) => (None, Some("must be non-empty".to_string())),
            Some(_) => (None, Some("must be a string".to_string())),
        };
        let extra: Map<String, Value> = event
            .iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    FIELD_DEPLOYMENT_ID | FIELD_HOOK_EXECUTION_ID | FIELD_FUNCTION_NAME
                )
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(LifecycleHookContext {
            deployment_id,
            hook_execution_id,
            function_name,
            function_name_error,
            payload: if extra.is_empty() { None } else { Some(extra) },
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a field value unless it is absent or null.
fn present<'a>(map: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    map.get(field).filter(|value| !value.is_null())
}

/// Reads a required, non-empty string field.
fn required_str<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, TriggerError> {
    let text = optional_str(map, field)?.ok_or(TriggerError::MissingField(field))?;
    if text.is_empty() {
        return Err(TriggerError::InvalidField {
            field,
            reason: "must be non-empty".to_string(),
        });
    }
    Ok(text)
}

/// Reads an optional string field; a non-string value is an error.
fn optional_str<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, TriggerError> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(TriggerError::InvalidField {
            field,
            reason: "must be a string".to_string(),
        }),
    }
}

/// Reads a required object field.
fn required_object<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Map<String, Value>, TriggerError> {
    match present(map, field) {
        None => Err(TriggerError::MissingField(field)),
        Some(Value::Object(object)) => Ok(object),
        Some(_) => Err(TriggerError::InvalidField {
            field,
            reason: "must be an object".to_string(),
        }),
    }
}
