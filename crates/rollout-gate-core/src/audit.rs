// crates/rollout-gate-core/src/audit.rs
// ============================================================================
// Module: Rollout Gate Audit Logging
// Description: Structured audit events for compliance and lifecycle-hook runs.
// Purpose: Emit redacted JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One audit event is recorded per invocation that reaches evaluation. Events
//! are JSON lines so the host log pipeline can index them directly. Tag values
//! and invocation payloads are never included; only keys, identifiers, and
//! classifications are.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ComplianceVerdict;
use crate::core::DeploymentId;
use crate::core::FunctionName;
use crate::core::HookExecutionId;
use crate::core::HookOutcome;
use crate::core::HookStage;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::runtime::GateReport;
use crate::runtime::GateState;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Compliance evaluation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Rule name when the trigger carried one.
    pub rule_name: Option<String>,
    /// Evaluated resource type.
    pub resource_type: ResourceType,
    /// Evaluated resource identifier.
    pub resource_id: ResourceId,
    /// Computed verdict.
    pub verdict: ComplianceVerdict,
    /// Required keys absent from the resource.
    pub missing_keys: Vec<String>,
    /// Ordering timestamp attached to the evaluation (milliseconds since epoch).
    pub ordering_timestamp_ms: i64,
    /// Whether the policy service accepted the submission.
    pub reported: bool,
    /// Submission error when the report failed.
    pub error: Option<String>,
}

/// Inputs for constructing a compliance audit event.
#[derive(Debug, Clone)]
pub struct ComplianceAuditParams {
    /// Rule name when the trigger carried one.
    pub rule_name: Option<String>,
    /// Evaluated resource type.
    pub resource_type: ResourceType,
    /// Evaluated resource identifier.
    pub resource_id: ResourceId,
    /// Computed verdict.
    pub verdict: ComplianceVerdict,
    /// Required keys absent from the resource.
    pub missing_keys: Vec<String>,
    /// Ordering timestamp (milliseconds since epoch).
    pub ordering_timestamp_ms: i64,
    /// Submission error when the report failed.
    pub error: Option<String>,
}

impl ComplianceAuditEvent {
    /// Creates a new compliance audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ComplianceAuditParams) -> Self {
        Self {
            event: "compliance_evaluation",
            timestamp_ms: now_ms(),
            rule_name: params.rule_name,
            resource_type: params.resource_type,
            resource_id: params.resource_id,
            verdict: params.verdict,
            missing_keys: params.missing_keys,
            ordering_timestamp_ms: params.ordering_timestamp_ms,
            reported: params.error.is_none(),
            error: params.error,
        }
    }
}

/// Lifecycle-hook audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GateAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Gate stage.
    pub stage: HookStage,
    /// Deployment identifier.
    pub deployment_id: DeploymentId,
    /// Hook execution identifier.
    pub hook_execution_id: HookExecutionId,
    /// Invoked target when the stage invoked one.
    pub target: Option<FunctionName>,
    /// Outcome sent to the orchestrator.
    pub outcome: HookOutcome,
    /// Failure classification label.
    pub failure_kind: Option<&'static str>,
    /// Failure detail.
    pub failure: Option<String>,
    /// Invocation latency in milliseconds.
    pub invocation_latency_ms: Option<u128>,
    /// States visited by the gate run.
    pub transitions: Vec<GateState>,
    /// Whether the orchestrator accepted the report.
    pub reported: bool,
    /// Report error when the orchestrator call failed.
    pub error: Option<String>,
}

impl GateAuditEvent {
    /// Creates a lifecycle-hook audit event from a gate report.
    #[must_use]
    pub fn new(
        deployment_id: DeploymentId,
        hook_execution_id: HookExecutionId,
        report: &GateReport,
        error: Option<String>,
    ) -> Self {
        Self {
            event: "lifecycle_hook",
            timestamp_ms: now_ms(),
            stage: report.stage,
            deployment_id,
            hook_execution_id,
            target: report.target.clone(),
            outcome: report.outcome,
            failure_kind: report.failure.as_ref().map(crate::core::GateFailure::kind),
            failure: report.failure.as_ref().map(ToString::to_string),
            invocation_latency_ms: report.invocation_latency.map(|latency| latency.as_millis()),
            transitions: report.trace.states().to_vec(),
            reported: error.is_none(),
            error,
        }
    }
}

/// Returns the current time in milliseconds since epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gate and compliance events.
pub trait AuditSink: Send + Sync {
    /// Records a compliance evaluation event.
    fn record_compliance(&self, event: &ComplianceAuditEvent);

    /// Records a lifecycle-hook event.
    fn record_gate(&self, event: &GateAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_compliance(&self, event: &ComplianceAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_gate(&self, event: &GateAuditEvent) {
        write_line(&mut io::stderr(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record_compliance(&self, event: &ComplianceAuditEvent) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }

    fn record_gate(&self, event: &GateAuditEvent) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_compliance(&self, _event: &ComplianceAuditEvent) {}

    fn record_gate(&self, _event: &GateAuditEvent) {}
}

/// Serializes one event as a JSON line; write failures are ignored.
fn write_line<W: Write + ?Sized, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
