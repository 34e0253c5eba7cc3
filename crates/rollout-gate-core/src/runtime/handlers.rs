// crates/rollout-gate-core/src/runtime/handlers.rs
// ============================================================================
// Module: Invocation Handlers
// Description: Entry points composing parsing, evaluation, and reporting.
// Purpose: Run one compliance or lifecycle-hook invocation end to end.
// Dependencies: crate::{audit, core, interfaces, runtime, telemetry}, serde
// ============================================================================

//! ## Overview
//! A handler owns nothing across invocations. It parses the trigger, runs the
//! evaluator or gate, reports once through the injected collaborator, then
//! records one audit event and one metric observation. Malformed input fails
//! before evaluation and produces no report, audit event, or metric.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::ComplianceAuditEvent;
use crate::audit::ComplianceAuditParams;
use crate::audit::GateAuditEvent;
use crate::core::ComplianceRequirement;
use crate::core::ComplianceVerdict;
use crate::core::HookOutcome;
use crate::core::HookStage;
use crate::core::LifecycleHookContext;
use crate::interfaces::ComplianceSink;
use crate::interfaces::HookStatusSink;
use crate::interfaces::PostTrafficCheck;
use crate::interfaces::ReportError;
use crate::runtime::evaluator::TagComplianceEvaluator;
use crate::runtime::gate::DeploymentGate;
use crate::runtime::gate::GateError;
use crate::runtime::gate::GateReport;
use crate::runtime::gate::HealthProbe;
use crate::runtime::gate::StageValidation;
use crate::runtime::reporter::ComplianceReporter;
use crate::runtime::trigger::ConfigChangeTrigger;
use crate::runtime::trigger::LifecycleHookTrigger;
use crate::runtime::trigger::TriggerError;
use crate::telemetry::GateMetrics;

// ============================================================================
// SECTION: Responses and Errors
// ============================================================================

/// Status label returned by the compliance handler.
const COMPLIANCE_STATUS_OK: &str = "ok";

/// Handler response serialized back to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HandlerResponse {
    /// Compliance evaluation was reported.
    Compliance {
        /// Always `"ok"`.
        status: &'static str,
        /// Whether the resource carried every required key.
        compliant: bool,
        /// Reported verdict.
        verdict: ComplianceVerdict,
    },
    /// Lifecycle hook was resolved.
    Hook {
        /// Reported outcome.
        status: HookOutcome,
    },
}

impl HandlerResponse {
    /// Builds the compliance response for a verdict.
    #[must_use]
    pub const fn compliance(verdict: ComplianceVerdict) -> Self {
        Self::Compliance {
            status: COMPLIANCE_STATUS_OK,
            compliant: verdict.is_compliant(),
            verdict,
        }
    }

    /// Builds the hook response for an outcome.
    #[must_use]
    pub const fn hook(outcome: HookOutcome) -> Self {
        Self::Hook {
            status: outcome,
        }
    }
}

/// Handler errors surfaced to the invoker.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The trigger payload was malformed; nothing was reported.
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    /// The compliance submission failed.
    #[error("compliance report failed: {0}")]
    Report(#[from] ReportError),
    /// The lifecycle-hook report failed.
    #[error(transparent)]
    Gate(#[from] GateError),
}

// ============================================================================
// SECTION: Observability
// ============================================================================

/// Audit and metrics sinks shared by the handlers.
#[derive(Clone, Copy)]
pub struct Observability<'a> {
    /// Audit sink.
    pub audit: &'a dyn AuditSink,
    /// Metrics sink.
    pub metrics: &'a dyn GateMetrics,
}

impl<'a> Observability<'a> {
    /// Creates an observability bundle.
    #[must_use]
    pub const fn new(audit: &'a dyn AuditSink, metrics: &'a dyn GateMetrics) -> Self {
        Self {
            audit,
            metrics,
        }
    }
}

// ============================================================================
// SECTION: Compliance Handler
// ============================================================================

/// Handles config-change triggers.
pub struct ComplianceHandler<'a> {
    /// Required tag keys.
    requirement: ComplianceRequirement,
    /// Policy-reporting collaborator.
    sink: &'a dyn ComplianceSink,
    /// Audit and metrics sinks.
    observability: Observability<'a>,
}

impl<'a> ComplianceHandler<'a> {
    /// Creates a compliance handler.
    #[must_use]
    pub const fn new(
        requirement: ComplianceRequirement,
        sink: &'a dyn ComplianceSink,
        observability: Observability<'a>,
    ) -> Self {
        Self {
            requirement,
            sink,
            observability,
        }
    }

    /// Evaluates one config-change trigger and reports the verdict once.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Trigger`] for malformed input (nothing is
    /// reported) and [`HandlerError::Report`] when the submission fails.
    pub fn handle(&self, event: &Value) -> Result<HandlerResponse, HandlerError> {
        let trigger = ConfigChangeTrigger::from_json(event)?;
        let verdict = TagComplianceEvaluator::verdict(&trigger.tags, &self.requirement);
        let missing_keys = TagComplianceEvaluator::missing_keys(&trigger.tags, &self.requirement);

        let rule_name = trigger.rule_name;
        let resource_type = trigger.resource_type.clone();
        let resource_id = trigger.resource_id.clone();
        let ordering_timestamp_ms = trigger.captured_at.unix_millis();
        let reported = ComplianceReporter::new(self.sink).report(
            trigger.resource_type,
            trigger.resource_id,
            verdict,
            trigger.captured_at,
            trigger.result_token,
        );

        self.observability.audit.record_compliance(&ComplianceAuditEvent::new(
            ComplianceAuditParams {
                rule_name,
                resource_type,
                resource_id,
                verdict,
                missing_keys,
                ordering_timestamp_ms,
                error: reported.as_ref().err().map(ToString::to_string),
            },
        ));
        self.observability.metrics.record_compliance(verdict);

        reported?;
        Ok(HandlerResponse::compliance(verdict))
    }
}

// ============================================================================
// SECTION: Hook Handler
// ============================================================================

/// Handles lifecycle-hook triggers for both gate stages.
pub struct HookHandler<'a> {
    /// Pre-traffic health probe.
    probe: HealthProbe<'a>,
    /// Post-traffic check.
    post_check: &'a dyn PostTrafficCheck,
    /// Orchestrator reporting collaborator.
    reporter: &'a dyn HookStatusSink,
    /// Audit and metrics sinks.
    observability: Observability<'a>,
}

impl<'a> HookHandler<'a> {
    /// Creates a hook handler.
    #[must_use]
    pub const fn new(
        probe: HealthProbe<'a>,
        post_check: &'a dyn PostTrafficCheck,
        reporter: &'a dyn HookStatusSink,
        observability: Observability<'a>,
    ) -> Self {
        Self {
            probe,
            post_check,
            reporter,
            observability,
        }
    }

    /// Runs the gate for `stage` and resolves the hook exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Trigger`] for malformed input (nothing is
    /// reported) and [`HandlerError::Gate`] when the orchestrator report fails.
    pub fn handle(&self, stage: HookStage, event: &Value) -> Result<HandlerResponse, HandlerError> {
        let ctx = LifecycleHookTrigger::from_json(event)?;
        let validation = match stage {
            HookStage::PreTraffic => StageValidation::PreTraffic(self.probe.clone()),
            HookStage::PostTraffic => StageValidation::PostTraffic(self.post_check),
        };
        let gate = DeploymentGate::new(validation, self.reporter);

        match gate.run(&ctx) {
            Ok(report) => {
                self.observe(&ctx, &report, None);
                Ok(HandlerResponse::hook(report.outcome))
            }
            Err(err) => {
                let GateError::Report {
                    report,
                    source,
                    ..
                } = &err;
                self.observe(&ctx, report, Some(source.to_string()));
                Err(err.into())
            }
        }
    }

    /// Records the audit event and metrics for one gate run.
    fn observe(
        &self,
        ctx: &LifecycleHookContext,
        report: &GateReport,
        error: Option<String>,
    ) {
        self.observability.audit.record_gate(&GateAuditEvent::new(
            ctx.deployment_id.clone(),
            ctx.hook_execution_id.clone(),
            report,
            error,
        ));
        self.observability.metrics.record_hook_outcome(report.stage, report.outcome);
        if let Some(latency) = report.invocation_latency {
            self.observability.metrics.record_invocation_latency(report.stage, latency);
        }
    }
}
