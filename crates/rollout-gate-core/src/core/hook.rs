// crates/rollout-gate-core/src/core/hook.rs
// ============================================================================
// Module: Lifecycle Hook Model
// Description: Deployment lifecycle hook context, stages, and outcomes.
// Purpose: Describe what the orchestrator hands in and what the gate reports back.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A progressive rollout pauses at lifecycle hooks and waits for an external
//! pass/fail signal. [`LifecycleHookContext`] is the read-only input supplied
//! by the orchestrator; [`HookStatusReport`] is the single message sent back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::DeploymentId;
use crate::core::identifiers::FunctionName;
use crate::core::identifiers::HookExecutionId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Invocation target used when the trigger names none.
pub const DEFAULT_TARGET_FUNCTION: &str = "api-handler-prod";
/// Path of the synthetic health-check request.
pub const DEFAULT_HEALTH_PATH: &str = "/health";
/// HTTP method of the synthetic health-check request.
pub const DEFAULT_HEALTH_METHOD: &str = "GET";
/// Status code that marks a healthy target response.
pub const HEALTHY_STATUS_CODE: u16 = 200;

// ============================================================================
// SECTION: Stage and Outcome
// ============================================================================

/// Rollout stage a gate runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStage {
    /// Before any traffic reaches the new version.
    PreTraffic,
    /// After traffic has shifted to the new version.
    PostTraffic,
}

impl HookStage {
    /// Returns a stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreTraffic => "pre_traffic",
            Self::PostTraffic => "post_traffic",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass/fail signal reported to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookOutcome {
    /// Continue the rollout.
    Succeeded,
    /// Roll the deployment back.
    Failed,
}

impl HookOutcome {
    /// Returns the orchestrator wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for HookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Context and Report
// ============================================================================

/// Read-only context supplied by the orchestrator for one hook execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleHookContext {
    /// Deployment identifier.
    pub deployment_id: DeploymentId,
    /// Hook execution identifier.
    pub hook_execution_id: HookExecutionId,
    /// Optional invocation target named by the trigger.
    pub function_name: Option<FunctionName>,
    /// Why a `FunctionName` present in the trigger was unusable, if it was.
    pub function_name_error: Option<String>,
    /// Remaining trigger fields, kept opaque.
    pub payload: Option<Map<String, Value>>,
}

impl LifecycleHookContext {
    /// Creates a context with no target override and no extra payload.
    #[must_use]
    pub fn new(deployment_id: DeploymentId, hook_execution_id: HookExecutionId) -> Self {
        Self {
            deployment_id,
            hook_execution_id,
            function_name: None,
            function_name_error: None,
            payload: None,
        }
    }

    /// Sets the invocation target override.
    #[must_use]
    pub fn with_function_name(mut self, function_name: FunctionName) -> Self {
        self.function_name = Some(function_name);
        self
    }
}

/// Status message sent to the orchestrator for one hook execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookStatusReport {
    /// Deployment identifier.
    pub deployment_id: DeploymentId,
    /// Hook execution identifier.
    pub lifecycle_event_hook_execution_id: HookExecutionId,
    /// Reported outcome.
    pub status: HookOutcome,
}

// ============================================================================
// SECTION: Health Check Request
// ============================================================================

/// Synthetic request sent to the invocation target during pre-traffic validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckRequest {
    /// Request path.
    pub path: String,
    /// HTTP method.
    #[serde(rename = "httpMethod")]
    pub http_method: String,
}

impl Default for HealthCheckRequest {
    fn default() -> Self {
        Self {
            path: DEFAULT_HEALTH_PATH.to_string(),
            http_method: DEFAULT_HEALTH_METHOD.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Gate Failures
// ============================================================================

/// Reason a stage check resolved to [`HookOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateFailure {
    /// The target could not be invoked (transport, auth, throttling, timeout).
    TargetUnavailable {
        /// Transport error detail.
        detail: String,
    },
    /// The target ran but raised an error.
    FunctionError {
        /// Error classification reported by the invocation transport.
        detail: String,
    },
    /// The response payload was not a JSON object.
    MalformedPayload {
        /// Parse error detail.
        detail: String,
    },
    /// The response payload carried no `statusCode` field.
    MissingStatusCode,
    /// The response payload carried a non-success status code.
    UnexpectedStatus {
        /// Status code value as received.
        status_code: String,
    },
    /// A configured post-traffic check rejected the deployment.
    CheckRejected {
        /// Check-specific detail.
        detail: String,
    },
}

impl GateFailure {
    /// Returns a stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TargetUnavailable {
                ..
            } => "target_unavailable",
            Self::FunctionError {
                ..
            } => "function_error",
            Self::MalformedPayload {
                ..
            } => "malformed_payload",
            Self::MissingStatusCode => "missing_status_code",
            Self::UnexpectedStatus {
                ..
            } => "unexpected_status",
            Self::CheckRejected {
                ..
            } => "check_rejected",
        }
    }
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetUnavailable {
                detail,
            } => write!(f, "target unavailable: {detail}"),
            Self::FunctionError {
                detail,
            } => write!(f, "target raised an error: {detail}"),
            Self::MalformedPayload {
                detail,
            } => write!(f, "malformed target payload: {detail}"),
            Self::MissingStatusCode => f.write_str("target payload has no statusCode"),
            Self::UnexpectedStatus {
                status_code,
            } => write!(f, "target returned statusCode {status_code}"),
            Self::CheckRejected {
                detail,
            } => write!(f, "post-traffic check rejected deployment: {detail}"),
        }
    }
}

/// Result of a stage check: the outcome plus the failure reason when failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Outcome to report.
    pub outcome: HookOutcome,
    /// Failure classification when the outcome is [`HookOutcome::Failed`].
    pub failure: Option<GateFailure>,
}

impl CheckResult {
    /// A passing check.
    #[must_use]
    pub const fn succeeded() -> Self {
        Self {
            outcome: HookOutcome::Succeeded,
            failure: None,
        }
    }

    /// A failing check with its reason.
    #[must_use]
    pub const fn failed(failure: GateFailure) -> Self {
        Self {
            outcome: HookOutcome::Failed,
            failure: Some(failure),
        }
    }
}
