//! Structured JSON-lines debug log for probe runs
//!
//! Disabled unless `LBPROBE_DEBUG` is truthy. Entries go to
//! `~/.lbprobe/lbprobe-debug.log` (or `LBPROBE_LOG_PATH`) and are rotated into
//! gzip archives once the file grows past `LOG_ROTATION_SIZE_MB`.

use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::probe::url::redact_url;

const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: usize = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

pub const DEBUG_ENV: &str = "LBPROBE_DEBUG";
pub const LOG_PATH_ENV: &str = "LBPROBE_LOG_PATH";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub component: String,
    pub event: String,
    pub message: String,
    pub run_id: String,
    pub fields: HashMap<String, Value>,
}

struct RotatingWriter {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingWriter {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn append(&self, line: &str) -> io::Result<()> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            // rotation failures never block logging
            let _ = self.rotate_if_needed();
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(format!("{}\n", line).as_bytes())
    }

    fn rotate_if_needed(&self) -> io::Result<()> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;

        // another process holds the lock and is rotating
        if lock_file.try_lock_exclusive().is_err() {
            return Ok(());
        }

        let result = if self.needs_rotation()? {
            self.rotate()
        } else {
            Ok(())
        };
        // the lock file is never removed, only unlocked
        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn needs_rotation(&self) -> io::Result<bool> {
        match std::fs::metadata(&self.log_path) {
            Ok(meta) => Ok(meta.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn rotate(&self) -> io::Result<()> {
        let (dir, stem) = split_log_path(&self.log_path)?;
        let archive_path = dir.join(format!(
            "{}.{}.gz",
            stem,
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        let temp_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &temp_path)?;

        let mut encoder = GzEncoder::new(File::create(&archive_path)?, Compression::default());
        io::copy(&mut BufReader::new(File::open(&temp_path)?), &mut encoder)?;
        encoder.finish()?;
        std::fs::remove_file(&temp_path)?;

        let _ = prune_archives(dir, &stem);
        Ok(())
    }
}

fn split_log_path(path: &Path) -> io::Result<(&Path, String)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
    Ok((dir, stem.to_string()))
}

/// Keep only the newest `MAX_ARCHIVES` archives of `stem`
fn prune_archives(dir: &Path, stem: &str) -> io::Result<()> {
    let prefix = format!("{}.", stem);
    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&prefix) && name.ends_with(".gz") {
            archives.push((entry.path(), entry.metadata()?.modified()?));
        }
    }

    archives.sort_by_key(|(_, modified)| *modified);
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for (path, _) in archives.into_iter().take(excess) {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}

pub struct DebugLogger {
    enabled: bool,
    // unsynchronized: each entry is one O_APPEND write
    writer: Option<RotatingWriter>,
    run_id: String,
    redaction_patterns: Vec<Regex>,
}

impl DebugLogger {
    /// Logger configured from `LBPROBE_DEBUG` and `LBPROBE_LOG_PATH`
    pub fn new() -> Self {
        let path = env::var(LOG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);
        Self::with_path(path, parse_debug_enabled())
    }

    /// Logger writing to an explicit path
    pub fn with_path(log_path: PathBuf, enabled: bool) -> Self {
        let writer = enabled.then(|| RotatingWriter::new(log_path));
        Self {
            enabled,
            writer,
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            redaction_patterns: compile_redaction_patterns(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            writer: None,
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            redaction_patterns: Vec::new(),
        }
    }

    /// Correlation id stamped on every entry from this logger
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn redact(&self, text: &str) -> String {
        self.redaction_patterns
            .iter()
            .fold(text.to_string(), |acc, re| {
                re.replace_all(&acc, "[REDACTED]").into_owned()
            })
    }

    fn log(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        fields: HashMap<String, Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact(message),
            run_id: self.run_id.clone(),
            fields,
        };

        if let Some(writer) = &self.writer {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writer.append(&line);
            }
        }
    }

    pub fn run_start(&self, scenario: &str, url: &str, requests: usize, deadline_ms: Option<u64>) {
        let mut fields = HashMap::new();
        fields.insert("scenario".to_string(), Value::from(scenario));
        fields.insert("url".to_string(), Value::from(redact_url(url)));
        fields.insert("requests".to_string(), Value::from(requests));
        fields.insert(
            "deadline_ms".to_string(),
            deadline_ms.map(Value::from).unwrap_or(Value::Null),
        );

        self.log(
            "PROBE",
            "Runner",
            "run_start",
            &format!("Starting {} run: {} requests", scenario, requests),
            fields,
        );
    }

    pub fn run_skipped(&self, scenario: &str, gate_var: &str) {
        let mut fields = HashMap::new();
        fields.insert("scenario".to_string(), Value::from(scenario));
        fields.insert("gate".to_string(), Value::from(gate_var));

        self.log(
            "PROBE",
            "Runner",
            "run_skipped",
            &format!("Skipping {} ({} not set)", scenario, gate_var),
            fields,
        );
    }

    pub fn probe_end(
        &self,
        index: usize,
        backend: Option<&str>,
        status_code: u16,
        latency_ms: u64,
    ) {
        let mut fields = HashMap::new();
        fields.insert("index".to_string(), Value::from(index));
        fields.insert(
            "backend".to_string(),
            backend.map(Value::from).unwrap_or(Value::Null),
        );
        fields.insert("http_status".to_string(), Value::from(status_code));
        fields.insert("latency_ms".to_string(), Value::from(latency_ms));

        self.log(
            "PROBE",
            "DistributionTester",
            "probe_end",
            &format!(
                "Request {} handled by {} ({}ms)",
                index,
                backend.unwrap_or("<none>"),
                latency_ms
            ),
            fields,
        );
    }

    pub fn probe_failed(&self, kind: &str, message: &str, index: Option<usize>) {
        let mut fields = HashMap::new();
        fields.insert("kind".to_string(), Value::from(kind));
        if let Some(index) = index {
            fields.insert("index".to_string(), Value::from(index));
        }

        self.log("ERROR", "DistributionTester", "probe_failed", message, fields);
    }

    pub fn distribution_summary(
        &self,
        distinct: usize,
        required: usize,
        passed: bool,
        record: Value,
    ) {
        let mut fields = HashMap::new();
        fields.insert("distinct".to_string(), Value::from(distinct));
        fields.insert("required".to_string(), Value::from(required));
        fields.insert("passed".to_string(), Value::from(passed));
        fields.insert("record".to_string(), record);

        self.log(
            "PROBE",
            "DistributionTester",
            "distribution_summary",
            &format!("{} of {} required backends observed", distinct, required),
            fields,
        );
    }

    pub fn throughput_summary(&self, requests: usize, total_ms: u64, average_ms: f64) {
        let mut fields = HashMap::new();
        fields.insert("requests".to_string(), Value::from(requests));
        fields.insert("total_ms".to_string(), Value::from(total_ms));
        fields.insert("average_ms".to_string(), Value::from(average_ms));

        self.log(
            "PERF",
            "DistributionTester",
            "throughput_summary",
            &format!("Completed {} requests in {}ms", requests, total_ms),
            fields,
        );
    }
}

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `LBPROBE_DEBUG`: true/1/yes/on (case insensitive) enable logging
pub fn parse_debug_enabled() -> bool {
    env::var(DEBUG_ENV)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(false)
}

fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lbprobe")
        .join("lbprobe-debug.log")
}

fn compile_redaction_patterns() -> Vec<Regex> {
    [
        r"(?i)bearer[:\s]+[^\s]+",
        r"(?i)authorization[:\s]+[^\s]+",
        r"(?i)token[:=\s]+[^\s&]+",
        r"(?i)password[:=\s]+[^\s&]+",
        r"(?i)api[_-]?key[:=\s]+[^\s&]+",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}
