use std::time::{Duration, Instant};

/// Clock abstraction for dependency injection and testing
///
/// Elapsed-time reporting and inter-request pacing both go through the clock,
/// so a test clock can make a run deterministic.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Get current monotonic time
    fn now(&self) -> Instant;
    /// Wait for `duration` before returning
    async fn sleep(&self, duration: Duration);
}

/// Production clock implementation using system time and the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
