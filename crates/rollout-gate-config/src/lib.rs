// crates/rollout-gate-config/src/lib.rs
// ============================================================================
// Module: Rollout Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for rollout-gate.toml semantics.
// Dependencies: rollout-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `rollout-gate-config` defines the configuration model for Rollout Gate:
//! required tag keys, pre- and post-traffic gate settings, AWS client
//! overrides, and audit and metric sinks. Validation is strict and fails
//! closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
