use serde::{Deserialize, Serialize};

/// Complete lbprobe configuration (`config.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub timing: TimingConfig,
    pub distribution: DistributionConfig,
    pub throughput: ThroughputConfig,
    pub gate: GateConfig,
}

/// Balancer endpoint under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Balancer base address, e.g. `http://balancer:8090`
    pub base_url: String,
    /// API path appended to the base address
    pub api_path: String,
    /// Response header naming the serving backend
    pub backend_header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub request_timeout_ms: u64,
    /// Pause between paced requests
    pub request_interval_ms: u64,
    /// Overall budget of one scenario run; 0 = unbounded
    pub max_run_duration_ms: u64,
}

/// Paced distribution scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub requests: usize,
    pub min_backends: usize,
}

/// Unpaced throughput scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThroughputConfig {
    pub requests: usize,
    /// Apply the request interval between throughput requests too
    pub paced: bool,
    /// Treat a missing backend header as fatal
    pub require_identifier: bool,
}

/// Environment flag that enables the scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub env_var: String,
}
