// crates/rollout-gate-core/src/core/mod.rs
// ============================================================================
// Module: Rollout Gate Core Types
// Description: Canonical data model for compliance and lifecycle hook checks.
// Purpose: Provide stable, serializable types shared by every handler.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types describe the inputs and outputs of a single invocation: tags and
//! required keys for compliance, hook context and outcomes for deployment
//! gates. Every value here is created, used, and discarded within one invocation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod compliance;
pub mod hook;
pub mod identifiers;
pub mod tags;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compliance::CaptureTime;
pub use compliance::ComplianceRequirement;
pub use compliance::ComplianceVerdict;
pub use compliance::DEFAULT_REQUIRED_TAGS;
pub use compliance::EvaluationRecord;
pub use compliance::PutAck;
pub use hook::CheckResult;
pub use hook::DEFAULT_HEALTH_METHOD;
pub use hook::DEFAULT_HEALTH_PATH;
pub use hook::DEFAULT_TARGET_FUNCTION;
pub use hook::GateFailure;
pub use hook::HEALTHY_STATUS_CODE;
pub use hook::HealthCheckRequest;
pub use hook::HookOutcome;
pub use hook::HookStage;
pub use hook::HookStatusReport;
pub use hook::LifecycleHookContext;
pub use identifiers::DeploymentId;
pub use identifiers::FunctionName;
pub use identifiers::HookExecutionId;
pub use identifiers::ResourceId;
pub use identifiers::ResourceType;
pub use identifiers::ResultToken;
pub use tags::Tag;
pub use tags::TagKeys;
pub use tags::TagShapeError;
pub use tags::TagSource;
