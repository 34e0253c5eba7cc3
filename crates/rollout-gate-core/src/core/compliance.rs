// crates/rollout-gate-core/src/core/compliance.rs
// ============================================================================
// Module: Compliance Model
// Description: Required-key policy, verdicts, and evaluation records.
// Purpose: Describe what is evaluated and what is submitted to the policy service.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A [`ComplianceRequirement`] is the fixed predicate shape this crate
//! evaluates: a set of tag keys that must all be present. The verdict is
//! wrapped into an [`EvaluationRecord`] that is built once per trigger and
//! consumed by value on submission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::identifiers::ResourceId;
use crate::core::identifiers::ResourceType;
use crate::core::identifiers::ResultToken;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag keys required when no explicit requirement is configured.
pub const DEFAULT_REQUIRED_TAGS: &[&str] = &["Owner", "Environment"];

// ============================================================================
// SECTION: Requirement
// ============================================================================

/// Set of tag keys a resource must carry.
///
/// # Invariants
/// - Keys keep first-seen order and are de-duplicated.
/// - Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComplianceRequirement {
    /// Required keys in first-seen order.
    keys: Vec<String>,
}

impl ComplianceRequirement {
    /// Builds a requirement from the provided keys, dropping duplicates.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            keys: unique,
        }
    }

    /// Returns a requirement with no keys; every resource satisfies it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            keys: Vec::new(),
        }
    }

    /// Returns the required keys.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns true when no keys are required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ComplianceRequirement {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_TAGS.iter().copied())
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Compliance classification reported to the policy service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceVerdict {
    /// Every required key is present.
    Compliant,
    /// At least one required key is missing.
    NonCompliant,
}

impl ComplianceVerdict {
    /// Maps a boolean predicate result to a verdict.
    #[must_use]
    pub const fn from_compliant(compliant: bool) -> Self {
        if compliant { Self::Compliant } else { Self::NonCompliant }
    }

    /// Returns true for [`ComplianceVerdict::Compliant`].
    #[must_use]
    pub const fn is_compliant(self) -> bool {
        matches!(self, Self::Compliant)
    }

    /// Returns the wire label used by the policy service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
        }
    }
}

impl fmt::Display for ComplianceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Capture Time
// ============================================================================

/// Ordering timestamp taken from the configuration item capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CaptureTime(OffsetDateTime);

impl CaptureTime {
    /// Parses an RFC 3339 timestamp (for example `2024-05-01T12:00:00.000Z`).
    ///
    /// # Errors
    ///
    /// Returns [`time::error::Parse`] when the value is not RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self)
    }

    /// Returns milliseconds since the unix epoch, saturating at the `i64` range.
    #[must_use]
    pub fn unix_millis(&self) -> i64 {
        let millis = self.0.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
    }
}

impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}ms", self.unix_millis()),
        }
    }
}

// ============================================================================
// SECTION: Evaluation Record
// ============================================================================

/// One evaluation submitted against a single-use result token.
///
/// # Invariants
/// - Fields are private; the record is never mutated after construction.
/// - The record owns the result token, so submitting it consumes the token.
#[derive(Debug, PartialEq, Eq)]
pub struct EvaluationRecord {
    /// Evaluated resource type.
    resource_type: ResourceType,
    /// Evaluated resource identifier.
    resource_id: ResourceId,
    /// Compliance verdict.
    verdict: ComplianceVerdict,
    /// Ordering timestamp.
    ordering_timestamp: CaptureTime,
    /// Single-use result token.
    result_token: ResultToken,
}

impl EvaluationRecord {
    /// Creates a new evaluation record.
    #[must_use]
    pub const fn new(
        resource_type: ResourceType,
        resource_id: ResourceId,
        verdict: ComplianceVerdict,
        ordering_timestamp: CaptureTime,
        result_token: ResultToken,
    ) -> Self {
        Self {
            resource_type,
            resource_id,
            verdict,
            ordering_timestamp,
            result_token,
        }
    }

    /// Returns the resource type.
    #[must_use]
    pub const fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Returns the resource identifier.
    #[must_use]
    pub const fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Returns the verdict.
    #[must_use]
    pub const fn verdict(&self) -> ComplianceVerdict {
        self.verdict
    }

    /// Returns the ordering timestamp.
    #[must_use]
    pub const fn ordering_timestamp(&self) -> CaptureTime {
        self.ordering_timestamp
    }

    /// Returns the result token.
    #[must_use]
    pub const fn result_token(&self) -> &ResultToken {
        &self.result_token
    }

    /// Consumes the record and returns its result token for submission.
    #[must_use]
    pub fn into_result_token(self) -> ResultToken {
        self.result_token
    }
}

/// Acknowledgement returned by the policy service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PutAck {
    /// Evaluations the service reported as failed, if any.
    pub failed_evaluations: usize,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn requirement_deduplicates_in_order() {
        let requirement = ComplianceRequirement::new(["Owner", "Environment", "Owner"]);
        assert_eq!(requirement.keys(), &["Owner".to_string(), "Environment".to_string()]);
    }

    #[test]
    fn default_requirement_is_owner_and_environment() {
        let requirement = ComplianceRequirement::default();
        assert_eq!(requirement.keys(), &["Owner".to_string(), "Environment".to_string()]);
    }

    #[test]
    fn verdict_serializes_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&ComplianceVerdict::NonCompliant).unwrap(),
            "\"NON_COMPLIANT\""
        );
        assert_eq!(ComplianceVerdict::from_compliant(true).as_str(), "COMPLIANT");
    }

    #[test]
    fn capture_time_parses_config_item_format() {
        let time = CaptureTime::parse_rfc3339("2016-02-17T01:36:34.043Z").unwrap();
        assert_eq!(time.unix_millis(), 1_455_672_994_043);
    }

    #[test]
    fn capture_time_rejects_non_rfc3339() {
        assert!(CaptureTime::parse_rfc3339("17/02/2016").is_err());
    }
}
