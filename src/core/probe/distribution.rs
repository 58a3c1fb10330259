//! Distribution record: backend identifier → number of requests it served

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-run mapping from backend identifier to observation count
///
/// Created empty at the start of a run; counts only ever grow. Entries are
/// kept sorted by identifier so summaries are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionRecord {
    counts: BTreeMap<String, u64>,
}

impl DistributionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation for `backend`
    pub fn record(&mut self, backend: &str) {
        *self.counts.entry(backend.to_string()).or_insert(0) += 1;
    }

    /// Observations for one backend (0 when never seen)
    pub fn count(&self, backend: &str) -> u64 {
        self.counts.get(backend).copied().unwrap_or(0)
    }

    /// Number of distinct backends observed
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total observations across all backends
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Compare the distinct backend count against a required minimum
    pub fn verify(&self, min_backends: usize) -> DistributionVerdict {
        let distinct = self.distinct();
        if distinct >= min_backends {
            DistributionVerdict::Met {
                distinct,
                required: min_backends,
            }
        } else {
            DistributionVerdict::Unmet {
                distinct,
                required: min_backends,
            }
        }
    }
}

/// Renders as `{server-a: 5, server-b: 5}`
impl fmt::Display for DistributionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (backend, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", backend, count)?;
        }
        f.write_str("}")
    }
}

impl<'a> FromIterator<&'a str> for DistributionRecord {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut record = Self::new();
        for backend in iter {
            record.record(backend);
        }
        record
    }
}

/// Outcome of the distribution check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DistributionVerdict {
    Met { distinct: usize, required: usize },
    Unmet { distinct: usize, required: usize },
}

impl DistributionVerdict {
    pub fn passed(&self) -> bool {
        matches!(self, DistributionVerdict::Met { .. })
    }

    pub fn distinct(&self) -> usize {
        match self {
            DistributionVerdict::Met { distinct, .. }
            | DistributionVerdict::Unmet { distinct, .. } => *distinct,
        }
    }

    pub fn required(&self) -> usize {
        match self {
            DistributionVerdict::Met { required, .. }
            | DistributionVerdict::Unmet { required, .. } => *required,
        }
    }
}
