use lbprobe::config::{Config, ConfigError};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::tempdir;

fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_defaults_match_reference_balancer() {
    let config = Config::default();
    assert_eq!(config.target.base_url, "http://balancer:8090");
    assert_eq!(config.target.api_path, "/api/v1/some-data");
    assert_eq!(config.target.backend_header, "lb-from");
    assert_eq!(config.distribution.requests, 10);
    assert_eq!(config.distribution.min_backends, 2);
    assert_eq!(config.throughput.requests, 20);
    assert!(!config.throughput.paced);
    assert!(!config.throughput.require_identifier);
    assert_eq!(config.timing.request_interval_ms, 100);
    assert_eq!(config.gate.env_var, "INTEGRATION_TEST");
    assert_eq!(config.run_deadline(), Some(Duration::from_secs(30)));
    assert!(config.check().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = Config::from_toml(
        r#"
[target]
base_url = "http://lb.internal:9000"

[distribution]
min_backends = 3
"#,
    )
    .unwrap();

    assert_eq!(config.target.base_url, "http://lb.internal:9000");
    assert_eq!(config.target.api_path, "/api/v1/some-data");
    assert_eq!(config.distribution.min_backends, 3);
    assert_eq!(config.distribution.requests, 10);
    assert_eq!(config.timing, Config::default().timing);
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = Config::from_toml("[target\nbase_url = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_init_writes_loadable_file_and_refuses_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lbprobe").join("config.toml");

    Config::init(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    let err = Config::init(&path).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyExists(p) if p == path));
}

#[test]
fn test_load_from_missing_file_is_read_error() {
    let dir = tempdir().unwrap();
    let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_env_overrides() {
    let env = env_of(&[
        ("LBPROBE_BASE_URL", "https://edge.example.com"),
        ("LBPROBE_HEADER", " x-served-by "),
        ("LBPROBE_MIN_BACKENDS", "4"),
        ("LBPROBE_DEADLINE_MS", "0"),
        ("LBPROBE_API_PATH", ""),
    ]);
    let mut config = Config::default();

    config.apply_env_with(|name| env.get(name).cloned()).unwrap();

    assert_eq!(config.target.base_url, "https://edge.example.com");
    assert_eq!(config.target.backend_header, "x-served-by");
    assert_eq!(config.target.api_path, "/api/v1/some-data");
    assert_eq!(config.distribution.min_backends, 4);
    assert_eq!(config.run_deadline(), None);
}

#[test]
fn test_env_invalid_number() {
    let env = env_of(&[("LBPROBE_TIMEOUT_MS", "soon")]);
    let mut config = Config::default();

    let err = config
        .apply_env_with(|name| env.get(name).cloned())
        .unwrap_err();

    match err {
        ConfigError::InvalidEnv { name, value } => {
            assert_eq!(name, "LBPROBE_TIMEOUT_MS");
            assert_eq!(value, "soon");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_check_rejects_invalid_settings() {
    let mut config = Config::default();
    config.distribution.min_backends = 0;
    assert!(matches!(config.check(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.target.backend_header = "lb from".to_string();
    assert!(matches!(config.check(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.timing.request_timeout_ms = 0;
    assert!(matches!(config.check(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.throughput.requests = 0;
    assert!(matches!(config.check(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.target.base_url = "ftp://balancer:8090".to_string();
    assert!(matches!(config.check(), Err(ConfigError::Target(_))));

    let mut config = Config::default();
    config.target.base_url = "not a url".to_string();
    assert!(matches!(config.check(), Err(ConfigError::Target(_))));
}

#[test]
fn test_tester_options_from_config() {
    let mut config = Config::default();
    config.target.base_url = "http://balancer:8090/".to_string();
    config.target.api_path = "api/v1/some-data".to_string();
    config.throughput.paced = true;

    let options = config.tester_options().unwrap();

    assert_eq!(options.request_url, "http://balancer:8090/api/v1/some-data");
    assert_eq!(options.backend_header, "lb-from");
    assert_eq!(options.request_timeout, Duration::from_millis(3000));
    assert_eq!(options.timeout_ms(), 3000);
    assert_eq!(options.request_interval, Duration::from_millis(100));
    assert_eq!(options.min_backends, 2);
    assert!(options.pace_throughput);
    assert!(!options.throughput_requires_identifier);
}
