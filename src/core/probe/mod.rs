//! Balancer probing
//!
//! Sequential HTTP probes against one balancer URL with:
//! - backend identification through a designated response header
//! - a per-run distribution record and minimum-backends verdict
//! - an explicit run deadline raced against every request and pause
//! - injectable HTTP client and clock for deterministic tests

pub mod client;
pub mod clock;
pub mod deadline;
pub mod distribution;
pub mod error;
pub mod tester;
pub mod types;
pub mod url;

// Re-export public API
pub use client::{IsahcProbeClient, ProbeClient, ProbeResponse};
pub use clock::{Clock, SystemClock};
pub use deadline::{Expired, RunDeadline};
pub use distribution::{DistributionRecord, DistributionVerdict};
pub use error::{format_duration, ProbeError};
pub use tester::{DistributionTester, ProbeObserver};
pub use types::{DistributionReport, ProbeObservation, TesterOptions, ThroughputReport};
pub use url::{build_request_url, redact_url, UrlError};
