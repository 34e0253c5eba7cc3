// crates/rollout-gate-core/src/runtime/reporter.rs
// ============================================================================
// Module: Compliance Reporter
// Description: Wraps a verdict into an evaluation record and submits it once.
// Purpose: Bind a compliance verdict to its single-use result token.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The reporter builds exactly one [`EvaluationRecord`] per call and hands it
//! to the policy-reporting collaborator. The result token moves into the
//! record, so a second submission for the same token cannot be expressed.
//! Submission failures propagate unchanged; there is no retry here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CaptureTime;
use crate::core::ComplianceVerdict;
use crate::core::EvaluationRecord;
use crate::core::PutAck;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::core::ResultToken;
use crate::interfaces::ComplianceSink;
use crate::interfaces::ReportError;

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Submits compliance verdicts to the policy-reporting collaborator.
pub struct ComplianceReporter<'a> {
    /// Policy-reporting collaborator.
    sink: &'a dyn ComplianceSink,
}

impl<'a> ComplianceReporter<'a> {
    /// Creates a reporter over the provided collaborator.
    #[must_use]
    pub const fn new(sink: &'a dyn ComplianceSink) -> Self {
        Self {
            sink,
        }
    }

    /// Builds one evaluation record and submits it against `result_token`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the collaborator fails or rejects the token.
    pub fn report(
        &self,
        resource_type: ResourceType,
        resource_id: ResourceId,
        verdict: ComplianceVerdict,
        captured_at: CaptureTime,
        result_token: ResultToken,
    ) -> Result<PutAck, ReportError> {
        let record =
            EvaluationRecord::new(resource_type, resource_id, verdict, captured_at, result_token);
        self.sink.put_evaluation(record)
    }
}
