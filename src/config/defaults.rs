use super::types::{
    Config, DistributionConfig, GateConfig, TargetConfig, ThroughputConfig, TimingConfig,
};

pub const DEFAULT_BASE_URL: &str = "http://balancer:8090";
pub const DEFAULT_API_PATH: &str = "/api/v1/some-data";
pub const DEFAULT_BACKEND_HEADER: &str = "lb-from";
pub const DEFAULT_MIN_BACKENDS: usize = 2;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 100;
pub const DEFAULT_MAX_RUN_DURATION_MS: u64 = 30_000;
pub const DEFAULT_DISTRIBUTION_REQUESTS: usize = 10;
pub const DEFAULT_THROUGHPUT_REQUESTS: usize = 20;
pub const DEFAULT_GATE_ENV: &str = "INTEGRATION_TEST";

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            backend_header: DEFAULT_BACKEND_HEADER.to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            request_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
            max_run_duration_ms: DEFAULT_MAX_RUN_DURATION_MS,
        }
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            requests: DEFAULT_DISTRIBUTION_REQUESTS,
            min_backends: DEFAULT_MIN_BACKENDS,
        }
    }
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            requests: DEFAULT_THROUGHPUT_REQUESTS,
            paced: false,
            require_identifier: false,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_GATE_ENV.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            timing: TimingConfig::default(),
            distribution: DistributionConfig::default(),
            throughput: ThroughputConfig::default(),
            gate: GateConfig::default(),
        }
    }
}
