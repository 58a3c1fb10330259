// Core types for balancer probing
use crate::core::probe::distribution::{DistributionRecord, DistributionVerdict};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Settings for one tester instance
#[derive(Debug, Clone, PartialEq)]
pub struct TesterOptions {
    /// Complete request URL (base address + API path)
    pub request_url: String,
    /// Response header naming the backend that served the request
    pub backend_header: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Sleep between paced probes
    pub request_interval: Duration,
    /// Minimum distinct backends for the distribution check
    pub min_backends: usize,
    /// Sleep between throughput probes as well
    pub pace_throughput: bool,
    /// Abort the throughput run when a response lacks the backend header
    pub throughput_requires_identifier: bool,
}

impl TesterOptions {
    pub fn timeout_ms(&self) -> u32 {
        u32::try_from(self.request_timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

/// One completed probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeObservation {
    /// 1-based position within the run
    pub index: usize,
    pub backend: Option<String>,
    pub status_code: u16,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
}

/// Result of a paced distribution run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub requests: usize,
    pub record: DistributionRecord,
    pub verdict: DistributionVerdict,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub observations: Vec<ProbeObservation>,
}

impl DistributionReport {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

/// Result of a throughput run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputReport {
    pub requests: usize,
    #[serde(rename = "total_ms", serialize_with = "serialize_millis")]
    pub total: Duration,
    #[serde(rename = "average_ms", serialize_with = "serialize_millis")]
    pub average: Duration,
    pub record: DistributionRecord,
    pub observations: Vec<ProbeObservation>,
}

impl ThroughputReport {
    /// Build a report from the run's total elapsed time; the average divides
    /// the total evenly across requests
    pub fn new(
        total: Duration,
        record: DistributionRecord,
        observations: Vec<ProbeObservation>,
    ) -> Self {
        let requests = observations.len();
        let average = match u32::try_from(requests) {
            Ok(0) => Duration::ZERO,
            Ok(n) => total / n,
            Err(_) => Duration::from_secs_f64(total.as_secs_f64() / requests as f64),
        };
        Self {
            requests,
            total,
            average,
            record,
            observations,
        }
    }

    /// Sum of individual request latencies
    pub fn latency_sum(&self) -> Duration {
        self.observations.iter().map(|o| o.latency).sum()
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
