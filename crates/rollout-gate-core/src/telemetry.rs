// crates/rollout-gate-core/src/telemetry.rs
// ============================================================================
// Module: Rollout Gate Telemetry
// Description: Metric hooks for gate outcomes, invocation latency, and verdicts.
// Purpose: Emit CloudWatch Embedded Metric Format records without an agent.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Handlers record metrics through the [`GateMetrics`] trait. [`EmfMetrics`]
//! writes one Embedded Metric Format document per observation; the log
//! pipeline extracts the metrics from the log line. Emission is
//! fire-and-forget and never changes a handler outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::ComplianceVerdict;
use crate::core::HookOutcome;
use crate::core::HookStage;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default metric namespace.
pub const DEFAULT_METRICS_NAMESPACE: &str = "RolloutGate";
/// Default service dimension value.
pub const DEFAULT_METRICS_SERVICE: &str = "rollout-gate";

/// Metric: hook outcomes by stage and outcome.
const METRIC_HOOK_OUTCOME: &str = "HookOutcome";
/// Metric: invocation latency by stage.
const METRIC_INVOCATION_LATENCY: &str = "InvocationLatency";
/// Metric: compliance evaluations by verdict.
const METRIC_COMPLIANCE_EVALUATIONS: &str = "ComplianceEvaluations";

// ============================================================================
// SECTION: Metric Units
// ============================================================================

/// Units supported by the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Plain count.
    Count,
    /// Milliseconds.
    Milliseconds,
}

impl MetricUnit {
    /// Returns the EMF unit label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Milliseconds => "Milliseconds",
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for gate and compliance handlers.
pub trait GateMetrics: Send + Sync {
    /// Records one hook outcome.
    fn record_hook_outcome(&self, stage: HookStage, outcome: HookOutcome);
    /// Records time spent waiting on the invocation target.
    fn record_invocation_latency(&self, stage: HookStage, latency: Duration);
    /// Records one compliance evaluation.
    fn record_compliance(&self, verdict: ComplianceVerdict);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl GateMetrics for NoopMetrics {
    fn record_hook_outcome(&self, _stage: HookStage, _outcome: HookOutcome) {}

    fn record_invocation_latency(&self, _stage: HookStage, _latency: Duration) {}

    fn record_compliance(&self, _verdict: ComplianceVerdict) {}
}

// ============================================================================
// SECTION: Embedded Metric Format
// ============================================================================

/// Embedded Metric Format emitter writing one JSON document per line.
pub struct EmfMetrics {
    /// Metric namespace.
    namespace: String,
    /// Service dimension value.
    service: String,
    /// Output writer.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl EmfMetrics {
    /// Creates an emitter writing to stderr.
    #[must_use]
    pub fn stderr(namespace: impl Into<String>, service: impl Into<String>) -> Self {
        Self::with_writer(namespace, service, Box::new(io::stderr()))
    }

    /// Creates an emitter writing to the provided writer.
    #[must_use]
    pub fn with_writer(
        namespace: impl Into<String>,
        service: impl Into<String>,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Builds the EMF document for one observation.
    #[must_use]
    pub fn document(
        &self,
        metric: &str,
        unit: MetricUnit,
        value: f64,
        dimensions: &[(&str, &str)],
    ) -> Value {
        let timestamp_ms = u64::try_from(
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis(),
        )
        .unwrap_or(u64::MAX);
        let mut dimension_names = vec![Value::from("Service")];
        dimension_names.extend(dimensions.iter().map(|(name, _)| Value::from(*name)));

        let mut root = Map::new();
        root.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": timestamp_ms,
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [dimension_names],
                    "Metrics": [{ "Name": metric, "Unit": unit.as_str() }],
                }],
            }),
        );
        root.insert("Service".to_string(), Value::from(self.service.as_str()));
        for (name, label) in dimensions {
            root.insert((*name).to_string(), Value::from(*label));
        }
        root.insert(metric.to_string(), json!(value));
        Value::Object(root)
    }

    /// Writes one observation; failures are ignored.
    fn emit(&self, metric: &str, unit: MetricUnit, value: f64, dimensions: &[(&str, &str)]) {
        let document = self.document(metric, unit, value, dimensions);
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{document}");
            let _ = writer.flush();
        }
    }
}

impl GateMetrics for EmfMetrics {
    fn record_hook_outcome(&self, stage: HookStage, outcome: HookOutcome) {
        self.emit(
            METRIC_HOOK_OUTCOME,
            MetricUnit::Count,
            1.0,
            &[("Stage", stage.as_str()), ("Outcome", outcome.as_str())],
        );
    }

    fn record_invocation_latency(&self, stage: HookStage, latency: Duration) {
        self.emit(
            METRIC_INVOCATION_LATENCY,
            MetricUnit::Milliseconds,
            latency.as_secs_f64() * 1_000.0,
            &[("Stage", stage.as_str())],
        );
    }

    fn record_compliance(&self, verdict: ComplianceVerdict) {
        self.emit(
            METRIC_COMPLIANCE_EVALUATIONS,
            MetricUnit::Count,
            1.0,
            &[("Verdict", verdict.as_str())],
        );
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
