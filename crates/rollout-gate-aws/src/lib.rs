// crates/rollout-gate-aws/src/lib.rs
// ============================================================================
// Module: Rollout Gate AWS Library
// Description: AWS-backed implementations of the Rollout Gate collaborator ports.
// Purpose: Bind the policy, orchestrator, and invocation ports to AWS services.
// Dependencies: aws-config, aws-sdk-{config,codedeploy,lambda}, tokio
// ============================================================================

//! ## Overview
//! [`AwsClients`] loads one shared SDK configuration and builds the AWS Config,
//! CodeDeploy, and Lambda clients. The adapters borrow those clients and
//! implement the blocking collaborator traits from `rollout-gate-core`.
//! Retries are left to the SDK defaults; adapters never retry on their own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clients;
pub mod codedeploy;
pub mod config_service;
pub mod lambda;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clients::AwsClients;
pub use clients::AwsError;
pub use codedeploy::CodeDeployHookReporter;
pub use config_service::ConfigServiceReporter;
pub use lambda::LambdaInvocationTarget;
