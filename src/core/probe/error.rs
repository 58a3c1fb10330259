use std::time::Duration;

/// Fatal failures of a probe run
///
/// Request indices are 1-based, matching the per-request log lines.
/// An unmet distribution is not an error: it is reported through
/// `DistributionVerdict` after the run completes.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Request {index} failed: {message}")]
    Transport { index: usize, message: String },
    #[error("Request {index}: missing server identifier")]
    MissingIdentifier { index: usize },
    #[error("Test timed out after {}", format_budget(.0))]
    DeadlineExceeded(Duration),
    /// Run cancelled from outside before its budget elapsed
    #[error("Test cancelled after {}", format_budget(.0))]
    Cancelled(Duration),
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl ProbeError {
    /// Index of the probe that failed, when the failure belongs to one probe
    pub fn index(&self) -> Option<usize> {
        match self {
            ProbeError::Transport { index, .. } | ProbeError::MissingIdentifier { index } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// Short machine-readable kind used in JSON output and debug logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Transport { .. } => "transport",
            ProbeError::MissingIdentifier { .. } => "missing_identifier",
            ProbeError::DeadlineExceeded(_) => "deadline_exceeded",
            ProbeError::Cancelled(_) => "cancelled",
            ProbeError::Client(_) => "client",
        }
    }
}

fn format_budget(budget: &Duration) -> String {
    format_duration(*budget)
}

/// Human-readable duration: `850ms`, `1.234s`, `30s`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        if millis == 0 && !duration.is_zero() {
            return format!("{}µs", duration.as_micros());
        }
        format!("{}ms", millis)
    } else if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
