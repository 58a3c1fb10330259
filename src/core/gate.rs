//! Environment gate for live balancer runs
//!
//! Scenarios only run when the gate variable holds a non-empty value;
//! otherwise they are skipped rather than failed.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationGate {
    env_var: String,
    enabled: bool,
}

impl IntegrationGate {
    /// Read the gate from the process environment
    pub fn from_env(env_var: &str) -> Self {
        Self::from_value(env_var, env::var(env_var).ok().as_deref())
    }

    /// Gate from an already-resolved value
    pub fn from_value(env_var: &str, value: Option<&str>) -> Self {
        Self {
            env_var: env_var.to_string(),
            enabled: value.is_some_and(|v| !v.is_empty()),
        }
    }

    /// Gate that always lets scenarios run (`--force`)
    pub fn forced(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// `Skipping <what> (set <VAR> to run)`
    pub fn skip_reason(&self, what: &str) -> String {
        format!("Skipping {} (set {} to run)", what, self.env_var)
    }
}
