// crates/rollout-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Deployment Gate
// Description: Per-invocation state machine for pre- and post-traffic hooks.
// Purpose: Invoke, interpret, and report exactly once, failing closed.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! A gate run walks `Start → (Invoking) → Evaluating → Reporting → Done`.
//! Pre-traffic runs invoke the target with a synthetic health-check request
//! and interpret the response; post-traffic runs delegate to a pluggable
//! [`PostTrafficCheck`]. Any uncertainty about target health resolves to
//! [`HookOutcome::Failed`]. Invocation errors and collaborator panics never
//! escape the gate: the orchestrator hook must always be resolved, so the
//! report is attempted on every path and only a reporting failure is
//! surfaced to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::CheckResult;
use crate::core::FunctionName;
use crate::core::GateFailure;
use crate::core::HEALTHY_STATUS_CODE;
use crate::core::HealthCheckRequest;
use crate::core::HookOutcome;
use crate::core::HookStage;
use crate::core::HookStatusReport;
use crate::core::LifecycleHookContext;
use crate::interfaces::HookStatusSink;
use crate::interfaces::InvocationError;
use crate::interfaces::InvocationResponse;
use crate::interfaces::InvocationTarget;
use crate::interfaces::PostTrafficCheck;
use crate::interfaces::ReportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Response field carrying the target's status code.
const STATUS_CODE_FIELD: &str = "statusCode";

// ============================================================================
// SECTION: Gate States
// ============================================================================

/// Control-flow states of a single gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Run created; nothing attempted yet.
    Start,
    /// Waiting on the invocation target.
    Invoking,
    /// Deriving the outcome.
    Evaluating,
    /// Sending the outcome to the orchestrator.
    Reporting,
    /// Run finished.
    Done,
}

impl GateState {
    /// Returns true when `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::Invoking | Self::Evaluating)
                | (Self::Invoking, Self::Evaluating)
                | (Self::Evaluating, Self::Reporting)
                | (Self::Reporting, Self::Done)
        )
    }
}

/// Ordered record of the states a run passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GateTrace(Vec<GateState>);

impl GateTrace {
    /// Starts a trace at [`GateState::Start`].
    fn start() -> Self {
        Self(vec![GateState::Start])
    }

    /// Records a transition.
    fn advance(&mut self, next: GateState) {
        debug_assert!(self.current().can_transition_to(next), "illegal gate transition");
        self.0.push(next);
    }

    /// Returns the latest state.
    #[must_use]
    pub fn current(&self) -> GateState {
        self.0.last().copied().unwrap_or(GateState::Start)
    }

    /// Returns every recorded state in order.
    #[must_use]
    pub fn states(&self) -> &[GateState] {
        &self.0
    }
}

// ============================================================================
// SECTION: Health Probe
// ============================================================================

/// Synthetic health check against an invocation target.
#[derive(Clone)]
pub struct HealthProbe<'a> {
    /// Invocation collaborator.
    target: &'a dyn InvocationTarget,
    /// Target used when the trigger names none.
    default_function: FunctionName,
    /// Synthetic request payload.
    request: HealthCheckRequest,
}

impl<'a> HealthProbe<'a> {
    /// Creates a probe with the given fallback target and request.
    #[must_use]
    pub const fn new(
        target: &'a dyn InvocationTarget,
        default_function: FunctionName,
        request: HealthCheckRequest,
    ) -> Self {
        Self {
            target,
            default_function,
            request,
        }
    }

    /// Returns the target named by the trigger, or the configured fallback.
    ///
    /// # Errors
    ///
    /// Returns [`GateFailure::TargetUnavailable`] when the trigger carried an
    /// unusable `FunctionName`; the fallback is never substituted for it.
    pub fn resolve_target(
        &self,
        ctx: &LifecycleHookContext,
    ) -> Result<FunctionName, GateFailure> {
        if let Some(reason) = &ctx.function_name_error {
            return Err(GateFailure::TargetUnavailable {
                detail: format!("FunctionName override {reason}"),
            });
        }
        Ok(ctx.function_name.clone().unwrap_or_else(|| self.default_function.clone()))
    }

    /// Invokes `function` and waits for a complete response.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when no response could be obtained.
    pub fn invoke(&self, function: &FunctionName) -> Result<InvocationResponse, InvocationError> {
        self.target.invoke(function, &self.request)
    }

    /// Invokes the resolved target and interprets the response.
    #[must_use]
    pub fn check(&self, ctx: &LifecycleHookContext) -> CheckResult {
        match self.resolve_target(ctx) {
            Ok(function) => guarded_invoke(self, &function),
            Err(failure) => CheckResult::failed(failure),
        }
    }
}

/// Invokes `function` and interprets the response; a panicking target fails the check.
fn guarded_invoke(probe: &HealthProbe<'_>, function: &FunctionName) -> CheckResult {
    match panic::catch_unwind(AssertUnwindSafe(|| probe.invoke(function))) {
        Ok(result) => interpret_health_response(result),
        Err(payload) => CheckResult::failed(GateFailure::TargetUnavailable {
            detail: format!("invocation panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Interprets an invocation result into a check result, failing closed.
///
/// Succeeds only when the target returned without a function error and the
/// payload is a JSON object whose `statusCode` is numerically 200.
#[must_use]
pub fn interpret_health_response(
    result: Result<InvocationResponse, InvocationError>,
) -> CheckResult {
    let response = match result {
        Ok(response) => response,
        Err(InvocationError::Transport(detail)) => {
            return CheckResult::failed(GateFailure::TargetUnavailable {
                detail,
            });
        }
        Err(InvocationError::Response(detail)) => {
            return CheckResult::failed(GateFailure::MalformedPayload {
                detail,
            });
        }
    };
    if let Some(detail) = response.function_error {
        return CheckResult::failed(GateFailure::FunctionError {
            detail,
        });
    }
    let payload: Value = match serde_json::from_slice(&response.payload) {
        Ok(payload) => payload,
        Err(err) => {
            return CheckResult::failed(GateFailure::MalformedPayload {
                detail: err.to_string(),
            });
        }
    };
    let Value::Object(fields) = payload else {
        return CheckResult::failed(GateFailure::MalformedPayload {
            detail: "payload must be a JSON object".to_string(),
        });
    };
    match fields.get(STATUS_CODE_FIELD) {
        None | Some(Value::Null) => CheckResult::failed(GateFailure::MissingStatusCode),
        Some(code) if is_healthy_status(code) => CheckResult::succeeded(),
        Some(code) => CheckResult::failed(GateFailure::UnexpectedStatus {
            status_code: code.to_string(),
        }),
    }
}

/// Returns true when the status code is numerically equal to 200.
fn is_healthy_status(code: &Value) -> bool {
    let Value::Number(number) = code else {
        return false;
    };
    if let Some(value) = number.as_u64() {
        return value == u64::from(HEALTHY_STATUS_CODE);
    }
    number
        .as_f64()
        .is_some_and(|value| (value - f64::from(HEALTHY_STATUS_CODE)).abs() < f64::EPSILON)
}

// ============================================================================
// SECTION: Post-Traffic Checks
// ============================================================================

/// Post-traffic policy when no blocking check is configured: always succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlockingCheck;

impl PostTrafficCheck for NoBlockingCheck {
    fn name(&self) -> &'static str {
        "none"
    }

    fn evaluate(&self, _ctx: &LifecycleHookContext) -> CheckResult {
        CheckResult::succeeded()
    }
}

/// Post-traffic check that re-runs the health probe against the shifted target.
pub struct ProbeCheck<'a> {
    /// Probe used for the check.
    probe: HealthProbe<'a>,
}

impl<'a> ProbeCheck<'a> {
    /// Wraps a health probe as a post-traffic check.
    #[must_use]
    pub const fn new(probe: HealthProbe<'a>) -> Self {
        Self {
            probe,
        }
    }
}

impl PostTrafficCheck for ProbeCheck<'_> {
    fn name(&self) -> &'static str {
        "health_probe"
    }

    fn evaluate(&self, ctx: &LifecycleHookContext) -> CheckResult {
        self.probe.check(ctx)
    }
}

// ============================================================================
// SECTION: Stage Validation
// ============================================================================

/// Validation strategy for one gate stage.
pub enum StageValidation<'a> {
    /// Invoke the target and interpret its health response.
    PreTraffic(HealthProbe<'a>),
    /// Run a post-traffic check without an invoking phase.
    PostTraffic(&'a dyn PostTrafficCheck),
}

impl StageValidation<'_> {
    /// Returns the stage this validation belongs to.
    #[must_use]
    pub const fn stage(&self) -> HookStage {
        match self {
            Self::PreTraffic(_) => HookStage::PreTraffic,
            Self::PostTraffic(_) => HookStage::PostTraffic,
        }
    }
}

// ============================================================================
// SECTION: Gate Report and Errors
// ============================================================================

/// Summary of one gate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateReport {
    /// Stage that ran.
    pub stage: HookStage,
    /// Outcome sent to the orchestrator.
    pub outcome: HookOutcome,
    /// Failure classification when the outcome is failed.
    pub failure: Option<GateFailure>,
    /// Invocation target, when the stage invoked one.
    pub target: Option<FunctionName>,
    /// Time spent waiting on the invocation target.
    #[serde(skip)]
    pub invocation_latency: Option<Duration>,
    /// States visited by the run.
    pub trace: GateTrace,
}

/// Gate errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum GateError {
    /// The orchestrator report failed after the outcome was computed.
    #[error("lifecycle hook report failed ({outcome}): {source}")]
    Report {
        /// Outcome that could not be reported.
        outcome: HookOutcome,
        /// Run summary up to the failed report.
        report: Box<GateReport>,
        /// Underlying reporting error.
        source: ReportError,
    },
}

// ============================================================================
// SECTION: Deployment Gate
// ============================================================================

/// One-shot deployment gate over injected collaborators.
pub struct DeploymentGate<'a> {
    /// Stage validation strategy.
    validation: StageValidation<'a>,
    /// Orchestrator reporting collaborator.
    reporter: &'a dyn HookStatusSink,
}

impl<'a> DeploymentGate<'a> {
    /// Creates a gate for the given stage validation.
    #[must_use]
    pub const fn new(validation: StageValidation<'a>, reporter: &'a dyn HookStatusSink) -> Self {
        Self {
            validation,
            reporter,
        }
    }

    /// Creates a pre-traffic gate.
    #[must_use]
    pub const fn pre_traffic(probe: HealthProbe<'a>, reporter: &'a dyn HookStatusSink) -> Self {
        Self::new(StageValidation::PreTraffic(probe), reporter)
    }

    /// Creates a post-traffic gate.
    #[must_use]
    pub const fn post_traffic(
        check: &'a dyn PostTrafficCheck,
        reporter: &'a dyn HookStatusSink,
    ) -> Self {
        Self::new(StageValidation::PostTraffic(check), reporter)
    }

    /// Returns the gate stage.
    #[must_use]
    pub const fn stage(&self) -> HookStage {
        self.validation.stage()
    }

    /// Runs the gate for one hook execution and reports exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Report`] when the orchestrator report fails. The
    /// computed outcome is carried in the error.
    pub fn run(&self, ctx: &LifecycleHookContext) -> Result<GateReport, GateError> {
        let mut trace = GateTrace::start();
        let (check, target, invocation_latency) = match &self.validation {
            StageValidation::PreTraffic(probe) => match probe.resolve_target(ctx) {
                Ok(function) => {
                    trace.advance(GateState::Invoking);
                    let started = Instant::now();
                    let check = guarded_invoke(probe, &function);
                    let latency = started.elapsed();
                    trace.advance(GateState::Evaluating);
                    (check, Some(function), Some(latency))
                }
                Err(failure) => {
                    trace.advance(GateState::Evaluating);
                    (CheckResult::failed(failure), None, None)
                }
            },
            StageValidation::PostTraffic(check) => {
                trace.advance(GateState::Evaluating);
                let result = panic::catch_unwind(AssertUnwindSafe(|| check.evaluate(ctx)))
                    .unwrap_or_else(|payload| {
                        CheckResult::failed(GateFailure::CheckRejected {
                            detail: format!(
                                "{} check panicked: {}",
                                check.name(),
                                panic_message(payload.as_ref())
                            ),
                        })
                    });
                (result, None, None)
            }
        };

        trace.advance(GateState::Reporting);
        let status = HookStatusReport {
            deployment_id: ctx.deployment_id.clone(),
            lifecycle_event_hook_execution_id: ctx.hook_execution_id.clone(),
            status: check.outcome,
        };
        let reported = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reporter.put_hook_status(&status)
        }))
        .unwrap_or_else(|payload| {
            Err(ReportError::Transport(format!(
                "reporter panicked: {}",
                panic_message(payload.as_ref())
            )))
        });
        trace.advance(GateState::Done);

        let report = GateReport {
            stage: self.stage(),
            outcome: check.outcome,
            failure: check.failure,
            target,
            invocation_latency,
            trace,
        };
        match reported {
            Ok(()) => Ok(report),
            Err(source) => Err(GateError::Report {
                outcome: report.outcome,
                report: Box::new(report),
                source,
            }),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
