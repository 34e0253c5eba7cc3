// crates/rollout-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Rollout Gate Runtime
// Description: Evaluator, reporter, gate state machine, trigger parsing, handlers.
// Purpose: Execute one compliance or lifecycle-hook invocation over injected ports.
// Dependencies: crate::{audit, core, interfaces, telemetry}
// ============================================================================

//! ## Overview
//! Runtime modules implement the per-invocation flow: parse the trigger,
//! evaluate tags or run the deployment gate, and report exactly once. Every
//! adapter (CLI, AWS, tests) calls into these same handlers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod evaluator;
pub mod gate;
pub mod handlers;
pub mod memory;
pub mod reporter;
pub mod trigger;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use evaluator::TagComplianceEvaluator;
pub use gate::DeploymentGate;
pub use gate::GateError;
pub use gate::GateReport;
pub use gate::GateState;
pub use gate::GateTrace;
pub use gate::HealthProbe;
pub use gate::NoBlockingCheck;
pub use gate::ProbeCheck;
pub use gate::StageValidation;
pub use gate::interpret_health_response;
pub use handlers::ComplianceHandler;
pub use handlers::HandlerError;
pub use handlers::HandlerResponse;
pub use handlers::HookHandler;
pub use handlers::Observability;
pub use memory::RecordingComplianceSink;
pub use memory::RecordingHookStatusSink;
pub use memory::StaticInvocationTarget;
pub use memory::SubmittedEvaluation;
pub use reporter::ComplianceReporter;
pub use trigger::ConfigChangeTrigger;
pub use trigger::LifecycleHookTrigger;
pub use trigger::TriggerError;
