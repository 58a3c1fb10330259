//! Scenario execution: gate check, run deadline, outcome classification

use crate::config::Config;
use crate::core::debug_logger::DebugLogger;
use crate::core::gate::IntegrationGate;
use crate::core::probe::{
    DistributionReport, DistributionTester, ProbeError, RunDeadline, ThroughputReport,
};
use tokio_util::sync::CancellationToken;

pub const EXIT_OK: i32 = 0;
pub const EXIT_DISTRIBUTION_UNMET: i32 = 1;
pub const EXIT_ABORTED: i32 = 2;
pub const EXIT_CONFIG: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Paced probes followed by the distribution check
    Distribution,
    /// Unpaced probes reporting total and average latency
    Throughput,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Distribution, Scenario::Throughput];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Distribution => "distribution",
            Scenario::Throughput => "throughput",
        }
    }

    /// Wording used in the skip message
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Distribution => "integration test",
            Scenario::Throughput => "performance test",
        }
    }

    pub fn requests(&self, config: &Config) -> usize {
        match self {
            Scenario::Distribution => config.distribution.requests,
            Scenario::Throughput => config.throughput.requests,
        }
    }
}

#[derive(Debug)]
pub enum ScenarioOutcome {
    Skipped { scenario: Scenario, reason: String },
    Distribution(DistributionReport),
    Throughput(ThroughputReport),
    Aborted { scenario: Scenario, error: ProbeError },
}

impl ScenarioOutcome {
    pub fn scenario(&self) -> Scenario {
        match self {
            ScenarioOutcome::Skipped { scenario, .. }
            | ScenarioOutcome::Aborted { scenario, .. } => *scenario,
            ScenarioOutcome::Distribution(_) => Scenario::Distribution,
            ScenarioOutcome::Throughput(_) => Scenario::Throughput,
        }
    }

    pub fn passed(&self) -> bool {
        match self {
            ScenarioOutcome::Skipped { .. } | ScenarioOutcome::Throughput(_) => true,
            ScenarioOutcome::Distribution(report) => report.passed(),
            ScenarioOutcome::Aborted { .. } => false,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ScenarioOutcome::Aborted { .. } => EXIT_ABORTED,
            ScenarioOutcome::Distribution(report) if !report.passed() => EXIT_DISTRIBUTION_UNMET,
            _ => EXIT_OK,
        }
    }
}

/// Most severe exit code across outcomes
pub fn exit_code(outcomes: &[ScenarioOutcome]) -> i32 {
    outcomes
        .iter()
        .map(ScenarioOutcome::exit_code)
        .max()
        .unwrap_or(EXIT_OK)
}

pub struct ScenarioRunner {
    config: Config,
    gate: IntegrationGate,
    logger: DebugLogger,
    cancel: CancellationToken,
}

impl ScenarioRunner {
    pub fn new(config: Config, gate: IntegrationGate) -> Self {
        Self {
            config,
            gate,
            logger: DebugLogger::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_logger(mut self, logger: DebugLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that aborts every current and future run when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one scenario with a fresh record and its own deadline
    pub async fn run(
        &self,
        scenario: Scenario,
        tester: &mut DistributionTester,
    ) -> ScenarioOutcome {
        if !self.gate.is_enabled() {
            self.logger.run_skipped(scenario.name(), self.gate.env_var());
            return ScenarioOutcome::Skipped {
                scenario,
                reason: self.gate.skip_reason(scenario.label()),
            };
        }

        let requests = scenario.requests(&self.config);
        let deadline = RunDeadline::from_token(&self.cancel, self.config.run_deadline());
        self.logger.run_start(
            scenario.name(),
            &tester.options().request_url,
            requests,
            deadline.budget().map(|b| b.as_millis() as u64),
        );

        let result = match scenario {
            Scenario::Distribution => tester
                .run_paced(requests, &deadline)
                .await
                .map(ScenarioOutcome::Distribution),
            Scenario::Throughput => tester
                .run_unpaced(requests, &deadline)
                .await
                .map(ScenarioOutcome::Throughput),
        };

        result.unwrap_or_else(|error| ScenarioOutcome::Aborted { scenario, error })
    }

    /// Run scenarios in order; a failed scenario does not stop the next one
    pub async fn run_all(
        &self,
        scenarios: &[Scenario],
        tester: &mut DistributionTester,
    ) -> Vec<ScenarioOutcome> {
        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            outcomes.push(self.run(*scenario, tester).await);
        }
        outcomes
    }
}
