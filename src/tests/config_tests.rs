// Tests for loading settings from config.json and the environment
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};

use crate::config::{ManagerConfig, MAX_DURATION_SECS};
use crate::error::ConfigError;
use crate::process::Elevation;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = ManagerConfig::default();
    assert_eq!(config.vagrant_bin, "vagrant");
    assert_eq!(config.elevation, Elevation::Auto);
    assert!(!config.prune);

    let settings = config.scheduler_settings();
    assert_eq!(settings.update_interval, Duration::from_secs(600));
    assert_eq!(settings.min_interval, Duration::from_secs(10));
}

#[test]
fn test_missing_file_means_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ManagerConfig::from_file(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, ManagerConfig::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"vagrantBin": "/opt/vagrant/bin/vagrant", "minUpdateIntervalSecs": 30, "elevation": "never", "prune": true}}"#
    )
    .unwrap();

    let config = ManagerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.vagrant_bin, "/opt/vagrant/bin/vagrant");
    assert_eq!(config.min_update_interval_secs, 30);
    assert_eq!(config.elevation, Elevation::Never);
    assert!(config.prune);
    assert_eq!(config.update_interval_secs, 600);
    assert_eq!(config.command_timeout(), Duration::from_secs(1800));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{ not json").unwrap();

    let err = ManagerConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_env_overrides() {
    let mut config = ManagerConfig::default();
    config.apply_env(env(&[
        ("VAGRANT_TRAY_BIN", "/usr/local/bin/vagrant"),
        ("VAGRANT_TRAY_UPDATE_INTERVAL", "120"),
        ("VAGRANT_TRAY_MIN_UPDATE_INTERVAL", "5"),
        ("VAGRANT_TRAY_COMMAND_TIMEOUT", "60"),
        ("VAGRANT_TRAY_ELEVATION", "always"),
    ]));

    assert_eq!(config.vagrant_bin, "/usr/local/bin/vagrant");
    assert_eq!(config.update_interval_secs, 120);
    assert_eq!(config.min_update_interval_secs, 5);
    assert_eq!(config.command_timeout_secs, 60);
    assert_eq!(config.elevation, Elevation::Always);
}

#[test]
fn test_invalid_env_values_are_ignored() {
    let mut config = ManagerConfig::default();
    config.apply_env(env(&[
        ("VAGRANT_TRAY_BIN", "   "),
        ("VAGRANT_TRAY_UPDATE_INTERVAL", "ten minutes"),
        ("VAGRANT_TRAY_ELEVATION", "sudo"),
    ]));
    assert_eq!(config, ManagerConfig::default());
}

#[test]
fn test_zero_update_interval_is_clamped() {
    let config = ManagerConfig {
        update_interval_secs: 0,
        ..ManagerConfig::default()
    };
    assert_eq!(
        config.scheduler_settings().update_interval,
        Duration::from_secs(1)
    );
}

#[test]
fn test_huge_durations_are_clamped() {
    let max = u64::MAX.to_string();
    let mut config = ManagerConfig {
        query_timeout_secs: u64::MAX,
        ..ManagerConfig::default()
    };
    config.apply_env(env(&[
        ("VAGRANT_TRAY_UPDATE_INTERVAL", max.as_str()),
        ("VAGRANT_TRAY_MIN_UPDATE_INTERVAL", max.as_str()),
        ("VAGRANT_TRAY_COMMAND_TIMEOUT", max.as_str()),
    ]));
    assert_eq!(config.command_timeout_secs, u64::MAX);

    let cap = Duration::from_secs(MAX_DURATION_SECS);
    let settings = config.scheduler_settings();
    assert_eq!(settings.update_interval, cap);
    assert_eq!(settings.min_interval, cap);
    assert_eq!(config.command_timeout(), cap);
    assert_eq!(config.query_timeout(), cap);
}

#[test]
fn test_load_from_explicit_path() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "vagrantBin": "/opt/vagrant/bin/vagrant" }}"#).unwrap();

    let config = ManagerConfig::load_from(Some(file.path())).unwrap();
    assert_eq!(config.vagrant_bin, "/opt/vagrant/bin/vagrant");
}
