//! Run deadline: the overall time budget of one scenario run
//!
//! A deadline is a cancellation token plus an optional expiry instant. The
//! tester receives it explicitly and races every probe and every pacing sleep
//! against it, so deadline enforcement and probe issuance can be exercised
//! independently. Callers may also cancel a run early through the token.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a run deadline fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Expired {
    #[error("run budget elapsed")]
    BudgetElapsed,
    #[error("run cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RunDeadline {
    token: CancellationToken,
    budget: Option<Duration>,
    started_at: Instant,
    expires_at: Option<Instant>,
}

impl RunDeadline {
    /// Deadline that fires once `budget` has elapsed
    pub fn after(budget: Duration) -> Self {
        Self::with_token(CancellationToken::new(), Some(budget))
    }

    /// Deadline that only fires when cancelled explicitly
    pub fn unbounded() -> Self {
        Self::with_token(CancellationToken::new(), None)
    }

    /// Bounded or unbounded deadline, as configured
    pub fn from_budget(budget: Option<Duration>) -> Self {
        Self::with_token(CancellationToken::new(), budget)
    }

    /// Deadline bound to an outer token: cancelling `parent` cancels this run,
    /// cancelling this run leaves `parent` untouched
    pub fn from_token(parent: &CancellationToken, budget: Option<Duration>) -> Self {
        Self::with_token(parent.child_token(), budget)
    }

    fn with_token(token: CancellationToken, budget: Option<Duration>) -> Self {
        let started_at = Instant::now();
        Self {
            token,
            budget,
            started_at,
            expires_at: budget.map(|b| started_at + b),
        }
    }

    /// Configured budget (`None` = unbounded)
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Time since the deadline was created
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Cancel the run now
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Reason the deadline has fired, if it has; cancellation takes precedence
    pub fn expiry(&self) -> Option<Expired> {
        if self.token.is_cancelled() {
            return Some(Expired::Cancelled);
        }
        match self.expires_at {
            Some(at) if Instant::now() >= at => Some(Expired::BudgetElapsed),
            _ => None,
        }
    }

    /// Resolves once the deadline fires
    pub async fn expired(&self) -> Expired {
        match self.expires_at {
            Some(at) => {
                tokio::select! {
                    _ = self.token.cancelled() => Expired::Cancelled,
                    _ = tokio::time::sleep_until(at) => Expired::BudgetElapsed,
                }
            }
            None => {
                self.token.cancelled().await;
                Expired::Cancelled
            }
        }
    }

    /// Race `fut` against the deadline
    ///
    /// An already-expired deadline never polls `fut`. When both are ready the
    /// deadline wins.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Expired> {
        if let Some(expired) = self.expiry() {
            return Err(expired);
        }
        tokio::select! {
            biased;
            expired = self.expired() => Err(expired),
            out = fut => Ok(out),
        }
    }
}
