// crates/rollout-gate-core/tests/gate.rs
// ============================================================================
// Module: Deployment Gate Tests
// Description: Pre- and post-traffic gate runs over in-memory collaborators.
// Purpose: Ensure every path reports exactly once and fails closed.
// Dependencies: rollout-gate-core
// ============================================================================
//! ## Overview
//! Each test runs one gate and inspects the single report the orchestrator
//! received, the classified failure, and the recorded state trace.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use rollout_gate_core::CheckResult;
use rollout_gate_core::DEFAULT_TARGET_FUNCTION;
use rollout_gate_core::DeploymentGate;
use rollout_gate_core::DeploymentId;
use rollout_gate_core::FunctionName;
use rollout_gate_core::GateError;
use rollout_gate_core::GateFailure;
use rollout_gate_core::GateState;
use rollout_gate_core::HealthCheckRequest;
use rollout_gate_core::HealthProbe;
use rollout_gate_core::HookExecutionId;
use rollout_gate_core::HookStatusReport;
use rollout_gate_core::HookStatusSink;
use rollout_gate_core::HookOutcome;
use rollout_gate_core::HookStage;
use rollout_gate_core::InvocationError;
use rollout_gate_core::InvocationResponse;
use rollout_gate_core::InvocationTarget;
use rollout_gate_core::LifecycleHookContext;
use rollout_gate_core::NoBlockingCheck;
use rollout_gate_core::PostTrafficCheck;
use rollout_gate_core::ProbeCheck;
use rollout_gate_core::RecordingHookStatusSink;
use rollout_gate_core::ReportError;
use rollout_gate_core::StaticInvocationTarget;

fn context() -> LifecycleHookContext {
    LifecycleHookContext::new(DeploymentId::new("d-1"), HookExecutionId::new("exec-1"))
}

fn probe(target: &StaticInvocationTarget) -> HealthProbe<'_> {
    HealthProbe::new(
        target,
        FunctionName::new(DEFAULT_TARGET_FUNCTION),
        HealthCheckRequest::default(),
    )
}

fn run_pre_traffic(target: &StaticInvocationTarget) -> (HookOutcome, Option<GateFailure>) {
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::pre_traffic(probe(target), &sink).run(&context()).unwrap();
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, report.outcome);
    (report.outcome, report.failure)
}

// ============================================================================
// SECTION: Pre-Traffic
// ============================================================================

#[test]
fn healthy_target_succeeds() {
    let target = StaticInvocationTarget::with_status(200);
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::pre_traffic(probe(&target), &sink).run(&context()).unwrap();

    assert_eq!(report.stage, HookStage::PreTraffic);
    assert_eq!(report.outcome, HookOutcome::Succeeded);
    assert!(report.failure.is_none());
    assert!(report.invocation_latency.is_some());
    assert_eq!(
        report.trace.states(),
        &[
            GateState::Start,
            GateState::Invoking,
            GateState::Evaluating,
            GateState::Reporting,
            GateState::Done
        ]
    );

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].deployment_id.as_str(), "d-1");
    assert_eq!(reports[0].lifecycle_event_hook_execution_id.as_str(), "exec-1");
    assert_eq!(reports[0].status, HookOutcome::Succeeded);
}

#[test]
fn server_error_status_fails() {
    let (outcome, failure) = run_pre_traffic(&StaticInvocationTarget::with_status(500));
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(
        failure,
        Some(GateFailure::UnexpectedStatus {
            status_code: "500".to_string()
        })
    );
}

#[test]
fn transport_error_fails_closed() {
    let target =
        StaticInvocationTarget::failing(InvocationError::Transport("throttled".to_string()));
    let (outcome, failure) = run_pre_traffic(&target);
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(
        failure,
        Some(GateFailure::TargetUnavailable {
            detail: "throttled".to_string()
        })
    );
}

#[test]
fn function_error_fails_even_with_healthy_payload() {
    let target = StaticInvocationTarget::responding(InvocationResponse {
        function_error: Some("Unhandled".to_string()),
        payload: br#"{"statusCode":200}"#.to_vec(),
    });
    let (outcome, failure) = run_pre_traffic(&target);
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(failure.as_ref().map(GateFailure::kind), Some("function_error"));
}

#[test]
fn unparsable_payload_fails() {
    let target = StaticInvocationTarget::responding(InvocationResponse::from_payload("<html>"));
    let (outcome, failure) = run_pre_traffic(&target);
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(failure.as_ref().map(GateFailure::kind), Some("malformed_payload"));
}

#[test]
fn non_object_payload_fails() {
    let target = StaticInvocationTarget::responding(InvocationResponse::from_payload("200"));
    let (_, failure) = run_pre_traffic(&target);
    assert_eq!(failure.as_ref().map(GateFailure::kind), Some("malformed_payload"));
}

#[test]
fn missing_status_code_fails() {
    let target =
        StaticInvocationTarget::responding(InvocationResponse::from_payload(r#"{"body":"ok"}"#));
    let (outcome, failure) = run_pre_traffic(&target);
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(failure, Some(GateFailure::MissingStatusCode));
}

#[test]
fn trigger_function_name_overrides_default_target() {
    let target = StaticInvocationTarget::with_status(200);
    let sink = RecordingHookStatusSink::new();
    let ctx = context().with_function_name(FunctionName::new("api-handler-canary"));
    let report = DeploymentGate::pre_traffic(probe(&target), &sink).run(&ctx).unwrap();

    assert_eq!(report.target, Some(FunctionName::new("api-handler-canary")));
    assert_eq!(target.calls(), vec![FunctionName::new("api-handler-canary")]);
}

#[test]
fn default_target_is_used_without_override() {
    let target = StaticInvocationTarget::with_status(200);
    let sink = RecordingHookStatusSink::new();
    DeploymentGate::pre_traffic(probe(&target), &sink).run(&context()).unwrap();
    assert_eq!(target.calls(), vec![FunctionName::new(DEFAULT_TARGET_FUNCTION)]);
}

fn invalid_override_context() -> LifecycleHookContext {
    let mut ctx = context();
    ctx.function_name_error = Some("must be a string".to_string());
    ctx
}

#[test]
fn invalid_function_name_override_fails_without_invoking() {
    let target = StaticInvocationTarget::with_status(200);
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::pre_traffic(probe(&target), &sink)
        .run(&invalid_override_context())
        .unwrap();

    assert_eq!(report.outcome, HookOutcome::Failed);
    assert_eq!(report.failure.as_ref().map(GateFailure::kind), Some("target_unavailable"));
    assert!(report.target.is_none());
    assert!(target.calls().is_empty());
    assert_eq!(
        report.trace.states(),
        &[GateState::Start, GateState::Evaluating, GateState::Reporting, GateState::Done]
    );
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, HookOutcome::Failed);
}

#[test]
fn post_traffic_ignores_invalid_function_name_override() {
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::post_traffic(&NoBlockingCheck, &sink)
        .run(&invalid_override_context())
        .unwrap();
    assert_eq!(report.outcome, HookOutcome::Succeeded);
    assert_eq!(sink.reports().len(), 1);
}

struct PanickingTarget;

impl InvocationTarget for PanickingTarget {
    fn invoke(
        &self,
        _function: &FunctionName,
        _request: &HealthCheckRequest,
    ) -> Result<InvocationResponse, InvocationError> {
        panic!("sdk bug");
    }
}

#[test]
fn panicking_target_fails_closed_and_reports_once() {
    let sink = RecordingHookStatusSink::new();
    let probe = HealthProbe::new(
        &PanickingTarget,
        FunctionName::new(DEFAULT_TARGET_FUNCTION),
        HealthCheckRequest::default(),
    );
    let report = DeploymentGate::pre_traffic(probe, &sink).run(&context()).unwrap();

    assert_eq!(report.outcome, HookOutcome::Failed);
    match report.failure {
        Some(GateFailure::TargetUnavailable {
            detail,
        }) => assert!(detail.contains("sdk bug")),
        other => panic!("unexpected failure: {other:?}"),
    }
    assert_eq!(report.trace.current(), GateState::Done);
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, HookOutcome::Failed);
}

struct PanickingReporter;

impl HookStatusSink for PanickingReporter {
    fn put_hook_status(&self, _report: &HookStatusReport) -> Result<(), ReportError> {
        panic!("client dropped");
    }
}

#[test]
fn panicking_reporter_is_surfaced_as_report_error() {
    let target = StaticInvocationTarget::with_status(200);
    let err = DeploymentGate::pre_traffic(probe(&target), &PanickingReporter)
        .run(&context())
        .unwrap_err();

    let GateError::Report {
        outcome,
        source,
        ..
    } = err;
    assert_eq!(outcome, HookOutcome::Succeeded);
    assert!(matches!(source, ReportError::Transport(detail) if detail.contains("client dropped")));
}

#[test]
fn report_failure_is_surfaced_with_outcome() {
    let target = StaticInvocationTarget::with_status(500);
    let sink = RecordingHookStatusSink::rejecting(ReportError::Transport("timeout".to_string()));
    let err = DeploymentGate::pre_traffic(probe(&target), &sink).run(&context()).unwrap_err();

    let GateError::Report {
        outcome,
        report,
        source,
    } = err;
    assert_eq!(outcome, HookOutcome::Failed);
    assert_eq!(report.trace.current(), GateState::Done);
    assert_eq!(source, ReportError::Transport("timeout".to_string()));
    assert_eq!(sink.reports().len(), 1);
}

// ============================================================================
// SECTION: Post-Traffic
// ============================================================================

#[test]
fn post_traffic_default_always_succeeds() {
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::post_traffic(&NoBlockingCheck, &sink).run(&context()).unwrap();

    assert_eq!(report.stage, HookStage::PostTraffic);
    assert_eq!(report.outcome, HookOutcome::Succeeded);
    assert!(report.target.is_none());
    assert!(report.invocation_latency.is_none());
    assert_eq!(
        report.trace.states(),
        &[GateState::Start, GateState::Evaluating, GateState::Reporting, GateState::Done]
    );
    assert_eq!(sink.reports().len(), 1);
}

#[test]
fn probe_check_can_fail_post_traffic() {
    let target = StaticInvocationTarget::with_status(503);
    let check = ProbeCheck::new(probe(&target));
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::post_traffic(&check, &sink).run(&context()).unwrap();

    assert_eq!(check.name(), "health_probe");
    assert_eq!(report.outcome, HookOutcome::Failed);
    assert_eq!(sink.reports()[0].status, HookOutcome::Failed);
}

struct RejectingCheck;

impl PostTrafficCheck for RejectingCheck {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    fn evaluate(&self, _ctx: &LifecycleHookContext) -> CheckResult {
        CheckResult::failed(GateFailure::CheckRejected {
            detail: "error rate above threshold".to_string(),
        })
    }
}

struct PanickingCheck;

impl PostTrafficCheck for PanickingCheck {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn evaluate(&self, _ctx: &LifecycleHookContext) -> CheckResult {
        panic!("metrics query failed");
    }
}

#[test]
fn panicking_post_traffic_check_fails_and_reports_once() {
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::post_traffic(&PanickingCheck, &sink).run(&context()).unwrap();

    assert_eq!(report.outcome, HookOutcome::Failed);
    assert_eq!(report.failure.as_ref().map(GateFailure::kind), Some("check_rejected"));
    assert_eq!(sink.reports().len(), 1);
}

#[test]
fn custom_post_traffic_check_is_reported() {
    let sink = RecordingHookStatusSink::new();
    let report = DeploymentGate::post_traffic(&RejectingCheck, &sink).run(&context()).unwrap();
    assert_eq!(report.outcome, HookOutcome::Failed);
    assert_eq!(report.failure.as_ref().map(GateFailure::kind), Some("check_rejected"));
    assert_eq!(sink.reports().len(), 1);
}
