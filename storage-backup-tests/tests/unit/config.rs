//! Unit tests for configuration layering

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use storage_backup::config::{apply_env_overrides, Config};
use test_utils::ConfigBuilder;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_env_overrides_file_values() {
    let mut config = ConfigBuilder::complete().build();

    apply_env_overrides(
        &mut config,
        env(&[
            ("SUPABASE_BUCKET_NAME", "avatars"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/NEW"),
        ]),
    );

    assert_eq!(config.source.bucket, "avatars");
    assert_eq!(
        config.notifications.slack_webhook_url,
        "https://hooks.slack.com/services/NEW"
    );
    // Untouched values come from the file
    assert_eq!(config.destination.bucket, "archive");
}

#[test]
fn test_env_can_clear_value() {
    let mut config = ConfigBuilder::complete().build();
    apply_env_overrides(&mut config, env(&[("SLACK_WEBHOOK_URL", "")]));
    assert!(config.notifications.slack_webhook_url.is_empty());
}

#[test]
fn test_env_sets_directories() {
    let mut config = Config::default();
    apply_env_overrides(
        &mut config,
        env(&[
            ("BACKUP_STAGING_DIR", "/srv/backup/dist"),
            ("BACKUP_LOG_DIR", "/var/log/storage-backup"),
            ("BACKUP_LOG_LEVEL", "debug"),
        ]),
    );

    assert_eq!(config.staging_root(), PathBuf::from("/srv/backup/dist"));
    assert_eq!(
        config.global.log_directory,
        PathBuf::from("/var/log/storage-backup")
    );
    assert_eq!(config.global.log_level, "debug");
}

#[test]
fn test_partial_toml_uses_defaults() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.toml");
    fs::write(
        &path,
        r#"
[global]
schedule = "30 1 * * *"

[source]
bucket = "uploads"
file_page_size = 250
"#,
    )
    .unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let config: Config = toml::from_str(&contents).unwrap();

    assert_eq!(config.global.schedule, "30 1 * * *");
    assert_eq!(config.source.file_page_size, 250);
    assert_eq!(config.source.folder_page_size, 100);
    assert_eq!(config.source.signed_url_expiry_secs, 60);
    assert_eq!(config.notifications.timeout_seconds, 30);
    assert!(config.destination.endpoint_url.is_none());
}
