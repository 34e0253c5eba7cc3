// crates/rollout-gate-aws/src/config_service.rs
// ============================================================================
// Module: AWS Config Reporter
// Description: Policy-reporting port backed by AWS Config PutEvaluations.
// Purpose: Submit one evaluation per result token.
// Dependencies: aws-sdk-config, rollout-gate-core
// ============================================================================

//! ## Overview
//! Each [`EvaluationRecord`] becomes exactly one `PutEvaluations` call with a
//! single evaluation. The record's result token moves into the request. A
//! response listing failed evaluations is treated as a rejection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_sdk_config::primitives::DateTime;
use aws_sdk_config::types::ComplianceType;
use aws_sdk_config::types::Evaluation;
use rollout_gate_core::ComplianceSink;
use rollout_gate_core::ComplianceVerdict;
use rollout_gate_core::EvaluationRecord;
use rollout_gate_core::PutAck;
use rollout_gate_core::ReportError;

use crate::clients::AwsClients;
use crate::clients::block_on_with_runtime;
use crate::clients::classify_report_error;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Maps a verdict to the AWS Config compliance type.
#[must_use]
pub fn compliance_type(verdict: ComplianceVerdict) -> ComplianceType {
    match verdict {
        ComplianceVerdict::Compliant => ComplianceType::Compliant,
        ComplianceVerdict::NonCompliant => ComplianceType::NonCompliant,
    }
}

/// Splits a record into the SDK evaluation and its raw result token.
///
/// # Errors
///
/// Returns [`ReportError::Rejected`] when the evaluation cannot be built.
pub fn to_evaluation(record: EvaluationRecord) -> Result<(Evaluation, String), ReportError> {
    let evaluation = Evaluation::builder()
        .compliance_resource_type(record.resource_type().as_str())
        .compliance_resource_id(record.resource_id().as_str())
        .compliance_type(compliance_type(record.verdict()))
        .ordering_timestamp(DateTime::from_millis(record.ordering_timestamp().unix_millis()))
        .build()
        .map_err(|err| ReportError::Rejected(err.to_string()))?;
    Ok((evaluation, record.into_result_token().into_inner()))
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Policy-reporting port backed by AWS Config.
pub struct ConfigServiceReporter<'a> {
    /// Shared AWS clients.
    clients: &'a AwsClients,
}

impl<'a> ConfigServiceReporter<'a> {
    /// Creates a reporter over the shared clients.
    #[must_use]
    pub const fn new(clients: &'a AwsClients) -> Self {
        Self {
            clients,
        }
    }
}

impl ComplianceSink for ConfigServiceReporter<'_> {
    fn put_evaluation(&self, record: EvaluationRecord) -> Result<PutAck, ReportError> {
        let (evaluation, result_token) = to_evaluation(record)?;
        let client = self.clients.config.clone();
        let runtime =
            self.clients.runtime().map_err(|err| ReportError::Transport(err.to_string()))?;
        let failed = block_on_with_runtime(runtime, async move {
            client
                .put_evaluations()
                .evaluations(evaluation)
                .result_token(result_token)
                .send()
                .await
                .map(|output| output.failed_evaluations().len())
                .map_err(|err| classify_report_error(&err))
        })
        .map_err(|err| ReportError::Transport(err.to_string()))??;
        if failed > 0 {
            return Err(ReportError::Rejected(format!("{failed} evaluation(s) not accepted")));
        }
        Ok(PutAck {
            failed_evaluations: failed,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use rollout_gate_core::CaptureTime;
    use rollout_gate_core::ResourceId;
    use rollout_gate_core::ResourceType;
    use rollout_gate_core::ResultToken;

    use super::*;

    #[test]
    fn record_maps_to_single_evaluation() {
        let record = EvaluationRecord::new(
            ResourceType::new("AWS::EC2::Instance"),
            ResourceId::new("i-1"),
            ComplianceVerdict::NonCompliant,
            CaptureTime::parse_rfc3339("2016-02-17T01:36:34.043Z").unwrap(),
            ResultToken::new("tok"),
        );
        let (evaluation, token) = to_evaluation(record).unwrap();

        assert_eq!(token, "tok");
        assert_eq!(evaluation.compliance_resource_type(), "AWS::EC2::Instance");
        assert_eq!(evaluation.compliance_resource_id(), "i-1");
        assert_eq!(evaluation.compliance_type(), &ComplianceType::NonCompliant);
        assert_eq!(evaluation.ordering_timestamp().to_millis().unwrap(), 1_455_672_994_043);
    }

    #[test]
    fn verdicts_map_to_compliance_types() {
        assert_eq!(compliance_type(ComplianceVerdict::Compliant), ComplianceType::Compliant);
        assert_eq!(compliance_type(ComplianceVerdict::NonCompliant), ComplianceType::NonCompliant);
    }
}
