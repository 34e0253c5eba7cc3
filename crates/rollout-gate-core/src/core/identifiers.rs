// crates/rollout-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Rollout Gate Identifiers
// Description: Opaque identifiers carried by compliance and lifecycle triggers.
// Purpose: Keep resource, token, and deployment identifiers strongly typed.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings supplied by the triggering infrastructure.
//! They serialize transparently and are never interpreted by the core.
//! [`ResultToken`] is intentionally not `Clone`: a token moves into exactly one
//! [`crate::EvaluationRecord`] and from there into exactly one submission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares a cloneable string identifier with the shared accessor surface.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier! {
    /// Cloud resource type (for example `AWS::EC2::Instance`).
    ResourceType
}

string_identifier! {
    /// Cloud resource identifier.
    ResourceId
}

string_identifier! {
    /// Deployment identifier issued by the orchestrator.
    DeploymentId
}

string_identifier! {
    /// Lifecycle-event-hook execution identifier issued by the orchestrator.
    HookExecutionId
}

string_identifier! {
    /// Logical name (or alias ARN) of an invocation target.
    FunctionName
}

// ============================================================================
// SECTION: Result Token
// ============================================================================

/// Single-use result token binding an evaluation back to its trigger.
///
/// # Invariants
/// - Not `Clone`; ownership moves into the evaluation record on creation.
/// - `Debug` output is redacted so tokens never leak into logs.
#[derive(PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ResultToken(String);

impl ResultToken {
    /// Creates a result token from the raw trigger value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for transport adapters.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the raw value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for ResultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultToken(<redacted>)")
    }
}
