use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Cron schedule for backup runs (5 or 6 fields)
    #[serde(default)]
    pub schedule: String,

    /// Root of the local staging tree (defaults to `dist/` next to the binary)
    #[serde(default)]
    pub staging_directory: Option<PathBuf>,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            schedule: String::new(),
            staging_directory: None,
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// Source object storage (Supabase Storage API)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_role_key: String,
    #[serde(default)]
    pub bucket: String,

    /// Page size for the top-level folder listing
    #[serde(default = "default_folder_page_size")]
    pub folder_page_size: u32,

    /// Page size for each directory level of the recursive listing
    #[serde(default = "default_file_page_size")]
    pub file_page_size: u32,

    /// Validity of the signed download URLs
    #[serde(default = "default_signed_url_expiry")]
    pub signed_url_expiry_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            bucket: String::new(),
            folder_page_size: default_folder_page_size(),
            file_page_size: default_file_page_size(),
            signed_url_expiry_secs: default_signed_url_expiry(),
        }
    }
}

/// Destination S3 bucket
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,

    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default)]
    pub slack_webhook_url: String,

    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: String::new(),
            timeout_seconds: default_webhook_timeout(),
        }
    }
}

// Default value functions

fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_folder_page_size() -> u32 { 100 }
fn default_file_page_size() -> u32 { 1000 }
fn default_signed_url_expiry() -> u64 { 60 }
fn default_webhook_timeout() -> u64 { 30 }
