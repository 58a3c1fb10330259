// Console rendering for probe runs
use crate::core::probe::{format_duration, ProbeError, ProbeObservation};
use crate::core::runner::{Scenario, ScenarioOutcome};
use serde_json::{json, Value};

/// Renders per-request lines and run summaries
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// `Request 3 handled by: server-a`
    pub fn render_probe(&self, observation: &ProbeObservation) -> String {
        match &observation.backend {
            Some(backend) => format!("Request {} handled by: {}", observation.index, backend),
            None => format!(
                "Request {} returned no server identifier (HTTP {})",
                observation.index, observation.status_code
            ),
        }
    }

    /// Final summary line for one scenario
    pub fn render_outcome(&self, outcome: &ScenarioOutcome) -> String {
        match outcome {
            ScenarioOutcome::Skipped { reason, .. } => reason.clone(),
            ScenarioOutcome::Distribution(report) => {
                let distinct = report.verdict.distinct();
                if report.passed() {
                    format!(
                        "Successful distribution across {} servers: {}",
                        distinct, report.record
                    )
                } else {
                    format!(
                        "Expected requests to be distributed to at least {} servers, got {}: {}",
                        report.verdict.required(),
                        distinct,
                        report.record
                    )
                }
            }
            ScenarioOutcome::Throughput(report) => format!(
                "Completed {} requests in {} (avg {}/request)",
                report.requests,
                format_duration(report.total),
                format_duration(report.average)
            ),
            ScenarioOutcome::Aborted { scenario, error } => self.render_error(*scenario, error),
        }
    }

    /// Abort reason; throughput request failures read `Performance request {i} failed: ...`
    pub fn render_error(&self, scenario: Scenario, error: &ProbeError) -> String {
        match (scenario, error) {
            (Scenario::Throughput, ProbeError::Transport { index, message }) => {
                format!("Performance request {} failed: {}", index, message)
            }
            _ => error.to_string(),
        }
    }

    /// Machine-readable rendering of one scenario
    pub fn render_json(&self, outcome: &ScenarioOutcome) -> Value {
        let scenario = outcome.scenario().name();
        match outcome {
            ScenarioOutcome::Skipped { reason, .. } => json!({
                "scenario": scenario,
                "status": "skipped",
                "reason": reason,
            }),
            ScenarioOutcome::Distribution(report) => json!({
                "scenario": scenario,
                "status": if report.passed() { "passed" } else { "failed" },
                "report": report,
            }),
            ScenarioOutcome::Throughput(report) => json!({
                "scenario": scenario,
                "status": "passed",
                "report": report,
            }),
            ScenarioOutcome::Aborted { error, .. } => json!({
                "scenario": scenario,
                "status": "aborted",
                "error": {
                    "kind": error.kind(),
                    "index": error.index(),
                    "message": self.render_error(outcome.scenario(), error),
                },
            }),
        }
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}
