// crates/rollout-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Rollout Gate Interfaces
// Description: Collaborator ports for policy reporting, hook reporting, and invocation.
// Purpose: Define the narrow RPC surfaces the handlers depend on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Handlers never reach for process-wide clients. Every external collaborator
//! is passed in explicitly through one of these traits, so each invocation is
//! a self-contained transaction over injected ports. Implementations must not
//! retry internally; retry policy belongs to the surrounding transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CheckResult;
use crate::core::EvaluationRecord;
use crate::core::FunctionName;
use crate::core::HealthCheckRequest;
use crate::core::HookStatusReport;
use crate::core::LifecycleHookContext;
use crate::core::PutAck;

// ============================================================================
// SECTION: Reporting Errors
// ============================================================================

/// Errors returned by reporting collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The collaborator rejected the submission (token reused or expired, bad input).
    #[error("report rejected: {0}")]
    Rejected(String),
    /// The collaborator could not be reached.
    #[error("report transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Policy Reporting
// ============================================================================

/// Policy-reporting collaborator that accepts one evaluation per result token.
pub trait ComplianceSink {
    /// Submits an evaluation record, consuming its result token.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the submission fails or is rejected.
    fn put_evaluation(&self, record: EvaluationRecord) -> Result<PutAck, ReportError>;
}

// ============================================================================
// SECTION: Orchestrator Reporting
// ============================================================================

/// Deployment orchestrator collaborator that resolves lifecycle hooks.
pub trait HookStatusSink {
    /// Reports the outcome of one lifecycle hook execution.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report fails or is rejected.
    fn put_hook_status(&self, report: &HookStatusReport) -> Result<(), ReportError>;
}

// ============================================================================
// SECTION: Invocation Target
// ============================================================================

/// Errors raised before a target response could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The invocation call failed (network, auth, throttling, timeout).
    #[error("invocation transport error: {0}")]
    Transport(String),
    /// The response body could not be read.
    #[error("invocation response unreadable: {0}")]
    Response(String),
}

/// Raw response returned by an invocation target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResponse {
    /// Error classification when the target raised instead of returning.
    pub function_error: Option<String>,
    /// Response payload bytes.
    pub payload: Vec<u8>,
}

impl InvocationResponse {
    /// Creates a response carrying only a payload.
    #[must_use]
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            function_error: None,
            payload: payload.into(),
        }
    }
}

/// Synchronous invocation collaborator.
///
/// Calls block until a complete response arrives; timeouts are imposed by the
/// transport, not by callers.
pub trait InvocationTarget {
    /// Invokes the named target with the synthetic health-check request.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when no response could be obtained.
    fn invoke(
        &self,
        function: &FunctionName,
        request: &HealthCheckRequest,
    ) -> Result<InvocationResponse, InvocationError>;
}

// ============================================================================
// SECTION: Post-Traffic Check
// ============================================================================

/// Pluggable validation strategy for the post-traffic stage.
pub trait PostTrafficCheck {
    /// Returns a stable label for logs.
    fn name(&self) -> &'static str;

    /// Evaluates the deployment after traffic has shifted.
    fn evaluate(&self, ctx: &LifecycleHookContext) -> CheckResult;
}
