// crates/rollout-gate-aws/src/codedeploy.rs
// ============================================================================
// Module: CodeDeploy Hook Reporter
// Description: Orchestrator port backed by PutLifecycleEventHookExecutionStatus.
// Purpose: Resolve one lifecycle hook per gate run.
// Dependencies: aws-sdk-codedeploy, rollout-gate-core
// ============================================================================

//! ## Overview
//! Sends the gate outcome for one hook execution. Service rejections (unknown
//! or already-resolved hook) and transport failures are surfaced unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_sdk_codedeploy::types::LifecycleEventStatus;
use rollout_gate_core::HookOutcome;
use rollout_gate_core::HookStatusReport;
use rollout_gate_core::HookStatusSink;
use rollout_gate_core::ReportError;

use crate::clients::AwsClients;
use crate::clients::block_on_with_runtime;
use crate::clients::classify_report_error;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Maps a gate outcome to the CodeDeploy lifecycle status.
#[must_use]
pub fn lifecycle_status(outcome: HookOutcome) -> LifecycleEventStatus {
    match outcome {
        HookOutcome::Succeeded => LifecycleEventStatus::Succeeded,
        HookOutcome::Failed => LifecycleEventStatus::Failed,
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Orchestrator port backed by CodeDeploy.
pub struct CodeDeployHookReporter<'a> {
    /// Shared AWS clients.
    clients: &'a AwsClients,
}

impl<'a> CodeDeployHookReporter<'a> {
    /// Creates a reporter over the shared clients.
    #[must_use]
    pub const fn new(clients: &'a AwsClients) -> Self {
        Self {
            clients,
        }
    }
}

impl HookStatusSink for CodeDeployHookReporter<'_> {
    fn put_hook_status(&self, report: &HookStatusReport) -> Result<(), ReportError> {
        let client = self.clients.codedeploy.clone();
        let deployment_id = report.deployment_id.as_str().to_string();
        let execution_id = report.lifecycle_event_hook_execution_id.as_str().to_string();
        let status = lifecycle_status(report.status);
        let runtime =
            self.clients.runtime().map_err(|err| ReportError::Transport(err.to_string()))?;
        block_on_with_runtime(runtime, async move {
            client
                .put_lifecycle_event_hook_execution_status()
                .deployment_id(deployment_id)
                .lifecycle_event_hook_execution_id(execution_id)
                .status(status)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| classify_report_error(&err))
        })
        .map_err(|err| ReportError::Transport(err.to_string()))?
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
