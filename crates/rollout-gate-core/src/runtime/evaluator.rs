// crates/rollout-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Tag Compliance Evaluator
// Description: Required-key predicate over normalized tag sets.
// Purpose: Produce a deterministic compliance verdict without I/O.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The evaluator checks `required ⊆ keys(tags)` with exact, case-sensitive key
//! matching. It never inspects tag values and has no side effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ComplianceRequirement;
use crate::core::ComplianceVerdict;
use crate::core::TagKeys;
use crate::core::TagSource;

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Stateless evaluator for the required-tag predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagComplianceEvaluator;

impl TagComplianceEvaluator {
    /// Returns true iff every required key is present in the tag source.
    #[must_use]
    pub fn evaluate(tags: &TagSource, required: &ComplianceRequirement) -> bool {
        Self::evaluate_keys(&tags.keys(), required)
    }

    /// Returns true iff every required key is present in the key set.
    #[must_use]
    pub fn evaluate_keys(keys: &TagKeys, required: &ComplianceRequirement) -> bool {
        required.keys().iter().all(|key| keys.contains(key))
    }

    /// Returns the verdict for a tag source.
    #[must_use]
    pub fn verdict(tags: &TagSource, required: &ComplianceRequirement) -> ComplianceVerdict {
        ComplianceVerdict::from_compliant(Self::evaluate(tags, required))
    }

    /// Returns required keys absent from the tag source, in requirement order.
    #[must_use]
    pub fn missing_keys(tags: &TagSource, required: &ComplianceRequirement) -> Vec<String> {
        let keys = tags.keys();
        required.keys().iter().filter(|key| !keys.contains(key)).cloned().collect()
    }
}
