use super::types::*;
use crate::utils::cron;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid cron schedule '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load a `.env` file into the process environment.
///
/// An explicit `path` must exist. Without one, the usual `.env` lookup is
/// tried and only its absence is tolerated; a malformed file is an error.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)?;
            Ok(())
        }
        None => ignore_missing(dotenvy::dotenv()),
    }
}

fn ignore_missing(result: std::result::Result<PathBuf, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Load configuration from an optional TOML file, then apply environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Overlay environment values onto the configuration.
///
/// Only variables that are present override the current value; a variable
/// set to an empty string clears it.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let set = |target: &mut String, key: &str| {
        if let Some(value) = lookup(key) {
            *target = value;
        }
    };

    set(&mut config.source.url, "SUPABASE_URL");
    set(&mut config.source.service_role_key, "SUPABASE_SERVICE_ROLE_KEY");
    set(&mut config.source.bucket, "SUPABASE_BUCKET_NAME");

    set(&mut config.destination.region, "AWS_REGION");
    set(&mut config.destination.access_key_id, "AWS_ACCESS_KEY_ID");
    set(&mut config.destination.secret_access_key, "AWS_SECRET_ACCESS_KEY");
    set(&mut config.destination.bucket, "AWS_S3_BUCKET_NAME");

    set(&mut config.notifications.slack_webhook_url, "SLACK_WEBHOOK_URL");
    set(&mut config.global.schedule, "CRON_BACKUP");
    set(&mut config.global.log_level, "BACKUP_LOG_LEVEL");

    if let Some(endpoint) = lookup("AWS_ENDPOINT_URL") {
        config.destination.endpoint_url = Some(endpoint).filter(|e| !e.is_empty());
    }
    if let Some(dir) = lookup("BACKUP_STAGING_DIR") {
        config.global.staging_directory = Some(PathBuf::from(dir)).filter(|d| !d.as_os_str().is_empty());
    }
    if let Some(dir) = lookup("BACKUP_LOG_DIR") {
        if !dir.is_empty() {
            config.global.log_directory = PathBuf::from(dir);
        }
    }
}

/// Validate what the scheduler needs before it can start.
///
/// Remote settings (bucket names, credentials, webhook) are deliberately not
/// checked here: an empty value surfaces as a failure of the first remote
/// call that needs it.
pub fn validate_config(config: &Config) -> Result<()> {
    cron::parse_schedule(&config.global.schedule)?;

    if config.source.folder_page_size == 0 || config.source.file_page_size == 0 {
        return Err(ConfigError::ValidationError(
            "Listing page sizes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Names of settings that are still empty after loading
pub fn missing_values(config: &Config) -> Vec<&'static str> {
    let checks = [
        ("SUPABASE_URL", &config.source.url),
        ("SUPABASE_SERVICE_ROLE_KEY", &config.source.service_role_key),
        ("SUPABASE_BUCKET_NAME", &config.source.bucket),
        ("AWS_REGION", &config.destination.region),
        ("AWS_ACCESS_KEY_ID", &config.destination.access_key_id),
        ("AWS_SECRET_ACCESS_KEY", &config.destination.secret_access_key),
        ("AWS_S3_BUCKET_NAME", &config.destination.bucket),
        ("SLACK_WEBHOOK_URL", &config.notifications.slack_webhook_url),
        ("CRON_BACKUP", &config.global.schedule),
    ];

    checks
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}
