use crate::config::Config;
use crate::core::Scenario;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    Distribution,
    Throughput,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "lbprobe")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Load balancer distribution tester: checks requests reach multiple backends")]
pub struct Cli {
    /// Config file (default: <config dir>/lbprobe/config.toml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Scenario to run
    #[arg(short = 's', long, value_enum, default_value_t = ScenarioArg::All)]
    pub scenario: ScenarioArg,

    /// Balancer base address
    #[arg(long)]
    pub url: Option<String>,

    /// API path appended to the base address
    #[arg(long)]
    pub path: Option<String>,

    /// Response header naming the serving backend
    #[arg(long)]
    pub header: Option<String>,

    /// Minimum distinct backends required
    #[arg(long)]
    pub min_backends: Option<usize>,

    /// Number of requests for the selected scenario(s)
    #[arg(short = 'n', long)]
    pub requests: Option<usize>,

    /// Pause between paced requests
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Per-request timeout
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Overall budget per scenario run
    #[arg(long, conflicts_with = "no_deadline")]
    pub deadline_ms: Option<u64>,

    /// Run without an overall deadline
    #[arg(long)]
    pub no_deadline: bool,

    /// Pause between throughput requests too
    #[arg(long)]
    pub pace_throughput: bool,

    /// Fail the throughput run on a missing backend header
    #[arg(long)]
    pub require_identifier: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Run even when the gate variable is not set
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Write a default config file
    #[arg(long)]
    pub init: bool,

    /// Print the effective configuration
    #[arg(long)]
    pub print: bool,

    /// Validate the effective configuration
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        match self.scenario {
            ScenarioArg::Distribution => vec![Scenario::Distribution],
            ScenarioArg::Throughput => vec![Scenario::Throughput],
            ScenarioArg::All => Scenario::ALL.to_vec(),
        }
    }

    /// Apply flag overrides on top of file and environment settings
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.target.base_url = url.clone();
        }
        if let Some(path) = &self.path {
            config.target.api_path = path.clone();
        }
        if let Some(header) = &self.header {
            config.target.backend_header = header.clone();
        }
        if let Some(min) = self.min_backends {
            config.distribution.min_backends = min;
        }
        if let Some(requests) = self.requests {
            for scenario in self.scenarios() {
                match scenario {
                    Scenario::Distribution => config.distribution.requests = requests,
                    Scenario::Throughput => config.throughput.requests = requests,
                }
            }
        }
        if let Some(ms) = self.interval_ms {
            config.timing.request_interval_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            config.timing.request_timeout_ms = ms;
        }
        if let Some(ms) = self.deadline_ms {
            config.timing.max_run_duration_ms = ms;
        }
        if self.no_deadline {
            config.timing.max_run_duration_ms = 0;
        }
        if self.pace_throughput {
            config.throughput.paced = true;
        }
        if self.require_identifier {
            config.throughput.require_identifier = true;
        }
    }
}
