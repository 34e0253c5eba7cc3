// crates/rollout-gate-core/src/lib.rs
// ============================================================================
// Module: Rollout Gate Core Library
// Description: Public API surface for the Rollout Gate core.
// Purpose: Expose core types, collaborator interfaces, runtime handlers, and sinks.
// Dependencies: crate::{audit, core, interfaces, runtime, telemetry}
// ============================================================================

//! ## Overview
//! Rollout Gate core implements two short-lived checks. The compliance check
//! decides whether a changed resource carries every required tag key and
//! reports one verdict per result token. The deployment gate probes a new
//! function version before and after traffic shifts and resolves the
//! orchestrator's lifecycle hook exactly once, failing closed. All external
//! systems are reached through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use audit::AuditSink;
pub use audit::ComplianceAuditEvent;
pub use audit::FileAuditSink;
pub use audit::GateAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::ComplianceSink;
pub use interfaces::HookStatusSink;
pub use interfaces::InvocationError;
pub use interfaces::InvocationResponse;
pub use interfaces::InvocationTarget;
pub use interfaces::PostTrafficCheck;
pub use interfaces::ReportError;
pub use runtime::ComplianceHandler;
pub use runtime::ComplianceReporter;
pub use runtime::ConfigChangeTrigger;
pub use runtime::DeploymentGate;
pub use runtime::GateError;
pub use runtime::GateReport;
pub use runtime::GateState;
pub use runtime::HandlerError;
pub use runtime::HandlerResponse;
pub use runtime::HealthProbe;
pub use runtime::HookHandler;
pub use runtime::LifecycleHookTrigger;
pub use runtime::NoBlockingCheck;
pub use runtime::Observability;
pub use runtime::ProbeCheck;
pub use runtime::RecordingComplianceSink;
pub use runtime::RecordingHookStatusSink;
pub use runtime::StaticInvocationTarget;
pub use runtime::TagComplianceEvaluator;
pub use runtime::TriggerError;
pub use telemetry::EmfMetrics;
pub use telemetry::GateMetrics;
pub use telemetry::NoopMetrics;
