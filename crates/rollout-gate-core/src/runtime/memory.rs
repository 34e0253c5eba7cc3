// crates/rollout-gate-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Collaborators
// Description: Recording sinks and a static invocation target.
// Purpose: Run handlers without external services (tests and dry runs).
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Recording sinks keep every submission attempt, including attempts they
//! were told to reject, so callers can assert the exactly-once reporting
//! contract. The static target answers every invocation with one canned
//! response and remembers which functions were invoked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::json;

use crate::core::CaptureTime;
use crate::core::ComplianceVerdict;
use crate::core::EvaluationRecord;
use crate::core::FunctionName;
use crate::core::HealthCheckRequest;
use crate::core::HookStatusReport;
use crate::core::PutAck;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::interfaces::ComplianceSink;
use crate::interfaces::HookStatusSink;
use crate::interfaces::InvocationError;
use crate::interfaces::InvocationResponse;
use crate::interfaces::InvocationTarget;
use crate::interfaces::ReportError;

// ============================================================================
// SECTION: Compliance Sink
// ============================================================================

/// Evaluation captured by [`RecordingComplianceSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedEvaluation {
    /// Resource type.
    pub resource_type: ResourceType,
    /// Resource identifier.
    pub resource_id: ResourceId,
    /// Submitted verdict.
    pub verdict: ComplianceVerdict,
    /// Ordering timestamp.
    pub ordering_timestamp: CaptureTime,
    /// Result token the submission was made against.
    pub result_token: String,
}

/// Policy-reporting collaborator that records submissions in memory.
#[derive(Debug, Default)]
pub struct RecordingComplianceSink {
    /// Every submission attempt, in order.
    submissions: Mutex<Vec<SubmittedEvaluation>>,
    /// Error returned for every submission when set.
    rejection: Option<ReportError>,
}

impl RecordingComplianceSink {
    /// Creates a sink that accepts every submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that records and then rejects every submission.
    #[must_use]
    pub fn rejecting(error: ReportError) -> Self {
        Self {
            submissions: Mutex::default(),
            rejection: Some(error),
        }
    }

    /// Returns every submission attempt.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmittedEvaluation> {
        lock(&self.submissions).clone()
    }
}

impl ComplianceSink for RecordingComplianceSink {
    fn put_evaluation(&self, record: EvaluationRecord) -> Result<PutAck, ReportError> {
        lock(&self.submissions).push(SubmittedEvaluation {
            resource_type: record.resource_type().clone(),
            resource_id: record.resource_id().clone(),
            verdict: record.verdict(),
            ordering_timestamp: record.ordering_timestamp(),
            result_token: record.result_token().expose().to_string(),
        });
        match &self.rejection {
            Some(error) => Err(error.clone()),
            None => Ok(PutAck::default()),
        }
    }
}

// ============================================================================
// SECTION: Hook Status Sink
// ============================================================================

/// Orchestrator collaborator that records hook reports in memory.
#[derive(Debug, Default)]
pub struct RecordingHookStatusSink {
    /// Every report attempt, in order.
    reports: Mutex<Vec<HookStatusReport>>,
    /// Error returned for every report when set.
    rejection: Option<ReportError>,
}

impl RecordingHookStatusSink {
    /// Creates a sink that accepts every report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that records and then rejects every report.
    #[must_use]
    pub fn rejecting(error: ReportError) -> Self {
        Self {
            reports: Mutex::default(),
            rejection: Some(error),
        }
    }

    /// Returns every report attempt.
    #[must_use]
    pub fn reports(&self) -> Vec<HookStatusReport> {
        lock(&self.reports).clone()
    }
}

impl HookStatusSink for RecordingHookStatusSink {
    fn put_hook_status(&self, report: &HookStatusReport) -> Result<(), ReportError> {
        lock(&self.reports).push(report.clone());
        match &self.rejection {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Invocation Target
// ============================================================================

/// Invocation target that returns one canned result for every call.
#[derive(Debug)]
pub struct StaticInvocationTarget {
    /// Result returned for every invocation.
    result: Result<InvocationResponse, InvocationError>,
    /// Invoked functions, in order.
    calls: Mutex<Vec<FunctionName>>,
}

impl StaticInvocationTarget {
    /// Creates a target returning `response`.
    #[must_use]
    pub fn responding(response: InvocationResponse) -> Self {
        Self {
            result: Ok(response),
            calls: Mutex::default(),
        }
    }

    /// Creates a target returning `{"statusCode": status_code}`.
    #[must_use]
    pub fn with_status(status_code: u16) -> Self {
        Self::responding(InvocationResponse::from_payload(
            json!({ "statusCode": status_code }).to_string(),
        ))
    }

    /// Creates a target that fails every invocation with `error`.
    #[must_use]
    pub fn failing(error: InvocationError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::default(),
        }
    }

    /// Returns every invoked function name.
    #[must_use]
    pub fn calls(&self) -> Vec<FunctionName> {
        lock(&self.calls).clone()
    }
}

impl InvocationTarget for StaticInvocationTarget {
    fn invoke(
        &self,
        function: &FunctionName,
        _request: &HealthCheckRequest,
    ) -> Result<InvocationResponse, InvocationError> {
        lock(&self.calls).push(function.clone());
        self.result.clone()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
