// Config loading and validation tests

use hoststat::config::{AppConfig, StoreKind};
use std::path::PathBuf;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[sampling]
interval_ms = 1000
server = true
process = true

[store]
mode = "disk"
path = "data/hoststat.db"
retention_secs = 3600

[monitoring]
stats_log_interval_secs = 60
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.sampling.interval(), Duration::from_secs(1));
    assert!(config.sampling.server);
    assert_eq!(config.store.mode, StoreKind::Disk);
    assert_eq!(config.store.retention(), Duration::from_secs(3600));
    assert_eq!(config.monitoring.stats_log_interval_secs, 60);
}

#[test]
fn test_config_defaults() {
    let minimal = r#"
[sampling]

[store]
mode = "memory"

[monitoring]
stats_log_interval_secs = 30
"#;
    let config = AppConfig::load_from_str(minimal).expect("load_from_str");
    assert_eq!(config.sampling.interval_ms, 5000);
    assert!(config.sampling.server && config.sampling.process);
    assert_eq!(config.store.retention_secs, 24 * 60 * 60);
}

#[test]
fn test_config_path_per_collector() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    assert_eq!(
        config.store.path_for("server"),
        PathBuf::from("data/hoststat-server.db")
    );
}

#[test]
fn test_config_validation_rejects_zero_interval() {
    let bad = VALID_CONFIG.replace("interval_ms = 1000", "interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampling.interval_ms"));
}

#[test]
fn test_config_validation_rejects_no_collectors() {
    let bad = VALID_CONFIG
        .replace("server = true", "server = false")
        .replace("process = true", "process = false");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("at least one"));
}

#[test]
fn test_config_validation_rejects_empty_disk_path() {
    let bad = VALID_CONFIG.replace("path = \"data/hoststat.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("store.path"));
}

#[test]
fn test_config_validation_rejects_zero_retention() {
    let bad = VALID_CONFIG.replace("retention_secs = 3600", "retention_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retention_secs"));
}

#[test]
fn test_config_validation_rejects_zero_stats_log_interval() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 60",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_rejects_unknown_store_mode() {
    let bad = VALID_CONFIG.replace("mode = \"disk\"", "mode = \"cloud\"");
    assert!(AppConfig::load_from_str(&bad).is_err());
}
