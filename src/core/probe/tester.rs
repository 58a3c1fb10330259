/*!
Distribution tester: drives sequential probes against one balancer URL.

The tester owns the distribution record of the current run and is the only
component that mutates it. Each run starts from an empty record.

## Runs

- **Paced** (`run_paced`): N probes with a fixed sleep between them. Any
  transport failure, missing backend header or deadline expiry aborts the run.
  The distribution verdict is computed once all probes succeeded.
- **Unpaced** (`run_unpaced`): N probes back to back, measuring total and
  average elapsed time. Missing headers are tolerated unless
  `throughput_requires_identifier` is set; pacing can be enabled with
  `pace_throughput`.

No probe is retried. The run deadline is passed in explicitly and raced
against every request and every pacing sleep.
*/

use crate::core::debug_logger::DebugLogger;
use crate::core::probe::client::{IsahcProbeClient, ProbeClient};
use crate::core::probe::clock::{Clock, SystemClock};
use crate::core::probe::deadline::{Expired, RunDeadline};
use crate::core::probe::distribution::{DistributionRecord, DistributionVerdict};
use crate::core::probe::error::ProbeError;
use crate::core::probe::types::{
    DistributionReport, ProbeObservation, TesterOptions, ThroughputReport,
};

/// Callback invoked with every accepted probe, in order
pub type ProbeObserver = Box<dyn Fn(&ProbeObservation) + Send + Sync>;

pub struct DistributionTester {
    options: TesterOptions,
    client: Box<dyn ProbeClient>,
    clock: Box<dyn Clock>,
    logger: DebugLogger,
    observer: Option<ProbeObserver>,
    record: DistributionRecord,
}

impl DistributionTester {
    /// Tester backed by the isahc client and the system clock
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Client` if the HTTP client cannot be created.
    pub fn new(options: TesterOptions) -> Result<Self, ProbeError> {
        Ok(Self::with_client(options, Box::new(IsahcProbeClient::new()?)))
    }

    /// Tester with a custom HTTP client (for testing)
    pub fn with_client(options: TesterOptions, client: Box<dyn ProbeClient>) -> Self {
        Self {
            options,
            client,
            clock: Box::new(SystemClock),
            logger: DebugLogger::new(),
            observer: None,
            record: DistributionRecord::new(),
        }
    }

    /// Configure tester with custom clock (for testing)
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_logger(mut self, logger: DebugLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Receive each probe as soon as it is accepted into the run
    pub fn with_observer(mut self, observer: ProbeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &TesterOptions {
        &self.options
    }

    /// Distribution record of the current (or last) run
    pub fn record(&self) -> &DistributionRecord {
        &self.record
    }

    /// Check the current record against the configured minimum
    pub fn verify(&self) -> DistributionVerdict {
        self.record.verify(self.options.min_backends)
    }

    /// Issue one probe and record its backend identifier, if any
    ///
    /// A response without the backend header is not an error here; callers
    /// decide whether a missing identifier is fatal.
    ///
    /// # Errors
    ///
    /// * `ProbeError::DeadlineExceeded` - run budget elapsed before or during the request
    /// * `ProbeError::Cancelled` - run cancelled before or during the request
    /// * `ProbeError::Transport` - request failed or timed out
    pub async fn issue_probe(
        &mut self,
        index: usize,
        deadline: &RunDeadline,
    ) -> Result<ProbeObservation, ProbeError> {
        let request = self.client.get(
            &self.options.request_url,
            &self.options.backend_header,
            self.options.timeout_ms(),
        );

        let response = deadline
            .guard(request)
            .await
            .map_err(|expired| expired_error(deadline, expired))?
            .map_err(|message| ProbeError::Transport { index, message })?;

        if let Some(backend) = &response.backend {
            self.record.record(backend);
        }

        self.logger.probe_end(
            index,
            response.backend.as_deref(),
            response.status_code,
            response.duration.as_millis() as u64,
        );

        Ok(ProbeObservation {
            index,
            backend: response.backend,
            status_code: response.status_code,
            latency: response.duration,
        })
    }

    /// Run `count` probes with the configured pause between them, then
    /// verify the distribution
    ///
    /// # Errors
    ///
    /// Aborts on the first transport failure, missing identifier or deadline
    /// expiry. An unmet distribution is reported in the returned verdict.
    pub async fn run_paced(
        &mut self,
        count: usize,
        deadline: &RunDeadline,
    ) -> Result<DistributionReport, ProbeError> {
        self.record = DistributionRecord::new();
        let started = self.clock.now();
        let mut observations = Vec::with_capacity(count);

        for index in 1..=count {
            self.ensure_live(deadline)?;

            let observation = match self.issue_probe(index, deadline).await {
                Ok(observation) => observation,
                Err(err) => return Err(self.fail(err)),
            };
            if observation.backend.is_none() {
                return Err(self.fail(ProbeError::MissingIdentifier { index }));
            }
            self.notify(&observation);
            observations.push(observation);

            if index < count {
                self.pace(deadline).await?;
            }
        }

        let verdict = self.verify();
        self.logger.distribution_summary(
            verdict.distinct(),
            verdict.required(),
            verdict.passed(),
            serde_json::to_value(&self.record).unwrap_or_default(),
        );

        Ok(DistributionReport {
            requests: observations.len(),
            record: self.record.clone(),
            verdict,
            elapsed: self.clock.now().saturating_duration_since(started),
            observations,
        })
    }

    /// Run `count` probes back to back and report elapsed time
    ///
    /// # Errors
    ///
    /// Aborts on the first transport failure or deadline expiry, and on a
    /// missing identifier when `throughput_requires_identifier` is set.
    pub async fn run_unpaced(
        &mut self,
        count: usize,
        deadline: &RunDeadline,
    ) -> Result<ThroughputReport, ProbeError> {
        self.record = DistributionRecord::new();
        let started = self.clock.now();
        let mut observations = Vec::with_capacity(count);

        for index in 1..=count {
            self.ensure_live(deadline)?;

            let observation = match self.issue_probe(index, deadline).await {
                Ok(observation) => observation,
                Err(err) => return Err(self.fail(err)),
            };
            if observation.backend.is_none() && self.options.throughput_requires_identifier {
                return Err(self.fail(ProbeError::MissingIdentifier { index }));
            }
            self.notify(&observation);
            observations.push(observation);

            if self.options.pace_throughput && index < count {
                self.pace(deadline).await?;
            }
        }

        let total = self.clock.now().saturating_duration_since(started);
        let report = ThroughputReport::new(total, self.record.clone(), observations);
        self.logger.throughput_summary(
            report.requests,
            report.total.as_millis() as u64,
            report.average.as_secs_f64() * 1000.0,
        );
        Ok(report)
    }

    fn ensure_live(&self, deadline: &RunDeadline) -> Result<(), ProbeError> {
        match deadline.expiry() {
            Some(expired) => Err(self.fail(expired_error(deadline, expired))),
            None => Ok(()),
        }
    }

    async fn pace(&self, deadline: &RunDeadline) -> Result<(), ProbeError> {
        let interval = self.options.request_interval;
        if interval.is_zero() {
            return Ok(());
        }
        deadline
            .guard(self.clock.sleep(interval))
            .await
            .map_err(|expired| self.fail(expired_error(deadline, expired)))
    }

    fn notify(&self, observation: &ProbeObservation) {
        if let Some(observer) = &self.observer {
            observer(observation);
        }
    }

    fn fail(&self, err: ProbeError) -> ProbeError {
        self.logger.probe_failed(err.kind(), &err.to_string(), err.index());
        err
    }
}

fn expired_error(deadline: &RunDeadline, expired: Expired) -> ProbeError {
    match expired {
        Expired::BudgetElapsed => {
            ProbeError::DeadlineExceeded(deadline.budget().unwrap_or_else(|| deadline.elapsed()))
        }
        Expired::Cancelled => ProbeError::Cancelled(deadline.elapsed()),
    }
}
