//! Configuration loading, layering and validation
//!
//! Precedence, lowest first: built-in defaults, `config.toml`, `LBPROBE_*`
//! environment variables, command-line flags (applied by the CLI).

use std::path::{Path, PathBuf};
use std::time::Duration;

use isahc::http::header::HeaderName;

use super::types::Config;
use crate::core::probe::{build_request_url, TesterOptions, UrlError};

pub const CONFIG_DIR_NAME: &str = "lbprobe";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_BASE_URL: &str = "LBPROBE_BASE_URL";
pub const ENV_API_PATH: &str = "LBPROBE_API_PATH";
pub const ENV_HEADER: &str = "LBPROBE_HEADER";
pub const ENV_MIN_BACKENDS: &str = "LBPROBE_MIN_BACKENDS";
pub const ENV_TIMEOUT_MS: &str = "LBPROBE_TIMEOUT_MS";
pub const ENV_INTERVAL_MS: &str = "LBPROBE_INTERVAL_MS";
pub const ENV_DEADLINE_MS: &str = "LBPROBE_DEADLINE_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,
    #[error("Config read error ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config write error ({path}): {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: String, value: String },
    #[error("Invalid target: {0}")]
    Target(#[from] UrlError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Default location: `$CONFIG_DIR/lbprobe/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the default config file, falling back to built-in defaults when
    /// it does not exist
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load an explicit config file; missing keys take their defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write a default config file; an existing file is never overwritten
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = Self::default().to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn print(&self) -> Result<(), ConfigError> {
        print!("{}", self.to_toml()?);
        Ok(())
    }

    /// Apply `LBPROBE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_BASE_URL) {
            self.target.base_url = v;
        }
        if let Some(v) = get(ENV_API_PATH) {
            self.target.api_path = v;
        }
        if let Some(v) = get(ENV_HEADER) {
            self.target.backend_header = v;
        }
        if let Some(v) = get(ENV_MIN_BACKENDS) {
            self.distribution.min_backends = parse_env(ENV_MIN_BACKENDS, &v)?;
        }
        if let Some(v) = get(ENV_TIMEOUT_MS) {
            self.timing.request_timeout_ms = parse_env(ENV_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = get(ENV_INTERVAL_MS) {
            self.timing.request_interval_ms = parse_env(ENV_INTERVAL_MS, &v)?;
        }
        if let Some(v) = get(ENV_DEADLINE_MS) {
            self.timing.max_run_duration_ms = parse_env(ENV_DEADLINE_MS, &v)?;
        }
        Ok(())
    }

    /// Validate every setting a run depends on
    pub fn check(&self) -> Result<(), ConfigError> {
        build_request_url(&self.target.base_url, &self.target.api_path)?;

        if HeaderName::from_bytes(self.target.backend_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "backend_header {:?} is not a valid HTTP header name",
                self.target.backend_header
            )));
        }
        if self.timing.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.timing.request_timeout_ms > u32::MAX as u64 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms is too large".to_string(),
            ));
        }
        if self.distribution.requests == 0 || self.throughput.requests == 0 {
            return Err(ConfigError::Invalid(
                "request counts must be at least 1".to_string(),
            ));
        }
        if self.distribution.min_backends == 0 {
            return Err(ConfigError::Invalid(
                "min_backends must be at least 1".to_string(),
            ));
        }
        if self.gate.env_var.trim().is_empty() {
            return Err(ConfigError::Invalid("gate env_var must not be empty".to_string()));
        }
        Ok(())
    }

    /// Overall run budget (`None` = unbounded)
    pub fn run_deadline(&self) -> Option<Duration> {
        match self.timing.max_run_duration_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Validated tester settings derived from this configuration
    pub fn tester_options(&self) -> Result<TesterOptions, ConfigError> {
        self.check()?;
        Ok(TesterOptions {
            request_url: build_request_url(&self.target.base_url, &self.target.api_path)?,
            backend_header: self.target.backend_header.clone(),
            request_timeout: Duration::from_millis(self.timing.request_timeout_ms),
            request_interval: Duration::from_millis(self.timing.request_interval_ms),
            min_backends: self.distribution.min_backends,
            pace_throughput: self.throughput.paced,
            throughput_requires_identifier: self.throughput.require_identifier,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
