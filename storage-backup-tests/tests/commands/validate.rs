//! Tests for the 'validate' command
//!
//! Validation only rejects what stops the scheduler from starting; empty
//! remote settings are reported but tolerated.

use std::fs;
use storage_backup::config::{load_config, missing_values, validate_config, ConfigError};
use test_utils::ConfigBuilder;

#[test]
fn test_validate_complete_config() {
    let (config_path, _temp_dir) = ConfigBuilder::complete().write_toml();

    let config = load_config(Some(&config_path)).unwrap();

    assert!(validate_config(&config).is_ok());
    assert_eq!(config.source.bucket, "uploads");
    assert_eq!(config.destination.region, "eu-west-1");
}

#[test]
fn test_validate_invalid_schedule() {
    let (config_path, _temp_dir) = ConfigBuilder::complete()
        .with_schedule("every night")
        .write_toml();

    let config = load_config(Some(&config_path)).unwrap();

    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::InvalidSchedule { .. })
    ));
}

#[test]
fn test_validate_zero_page_size() {
    let config = ConfigBuilder::complete().with_page_sizes(100, 0).build();
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_validate_invalid_toml() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid { toml content").unwrap();

    assert!(matches!(
        load_config(Some(&config_path)),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_validate_missing_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("absent.toml");

    assert!(matches!(
        load_config(Some(&config_path)),
        Err(ConfigError::ReadError(_))
    ));
}

#[test]
fn test_validate_reports_empty_settings() {
    let config = ConfigBuilder::new().with_schedule("0 2 * * *").build();

    assert!(validate_config(&config).is_ok());
    let missing = missing_values(&config);
    assert!(missing.contains(&"SUPABASE_BUCKET_NAME"));
    assert!(missing.contains(&"AWS_S3_BUCKET_NAME"));
    assert!(!missing.contains(&"CRON_BACKUP"));
}
