// crates/rollout-gate-aws/src/lambda.rs
// ============================================================================
// Module: Lambda Invocation Target
// Description: Invocation port backed by synchronous Lambda Invoke.
// Purpose: Send the synthetic health request and return the raw response.
// Dependencies: aws-sdk-lambda, rollout-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Invokes with `RequestResponse` so the call blocks until the target returns.
//! A populated `FunctionError` field means the target raised; it is passed
//! through for the gate to classify. Any SDK failure is a transport error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use rollout_gate_core::FunctionName;
use rollout_gate_core::HealthCheckRequest;
use rollout_gate_core::InvocationError;
use rollout_gate_core::InvocationResponse;
use rollout_gate_core::InvocationTarget;

use crate::clients::AwsClients;
use crate::clients::block_on_with_runtime;

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts an SDK invoke output into the port response.
#[must_use]
pub fn to_invocation_response(output: &InvokeOutput) -> InvocationResponse {
    InvocationResponse {
        function_error: output.function_error().map(str::to_string),
        payload: output.payload().map(|blob| blob.as_ref().to_vec()).unwrap_or_default(),
    }
}

// ============================================================================
// SECTION: Target
// ============================================================================

/// Invocation port backed by Lambda.
pub struct LambdaInvocationTarget<'a> {
    /// Shared AWS clients.
    clients: &'a AwsClients,
}

impl<'a> LambdaInvocationTarget<'a> {
    /// Creates a target over the shared clients.
    #[must_use]
    pub const fn new(clients: &'a AwsClients) -> Self {
        Self {
            clients,
        }
    }
}

impl InvocationTarget for LambdaInvocationTarget<'_> {
    fn invoke(
        &self,
        function: &FunctionName,
        request: &HealthCheckRequest,
    ) -> Result<InvocationResponse, InvocationError> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| InvocationError::Transport(err.to_string()))?;
        let client = self.clients.lambda.clone();
        let function_name = function.as_str().to_string();
        let runtime =
            self.clients.runtime().map_err(|err| InvocationError::Transport(err.to_string()))?;
        block_on_with_runtime(runtime, async move {
            client
                .invoke()
                .function_name(function_name)
                .invocation_type(InvocationType::RequestResponse)
                .payload(Blob::new(payload))
                .send()
                .await
                .map(|output| to_invocation_response(&output))
                .map_err(|err| InvocationError::Transport(DisplayErrorContext(&err).to_string()))
        })
        .map_err(|err| InvocationError::Transport(err.to_string()))?
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_error_and_payload_pass_through() {
        let output = InvokeOutput::builder()
            .status_code(200)
            .function_error("Unhandled")
            .payload(Blob::new(br#"{"errorMessage":"boom"}"#.to_vec()))
            .build();
        let response = to_invocation_response(&output);
        assert_eq!(response.function_error.as_deref(), Some("Unhandled"));
        assert_eq!(response.payload, br#"{"errorMessage":"boom"}"#.to_vec());
    }

    #[test]
    fn missing_payload_becomes_empty() {
        let output = InvokeOutput::builder().status_code(200).build();
        let response = to_invocation_response(&output);
        assert!(response.function_error.is_none());
        assert!(response.payload.is_empty());
    }
}
