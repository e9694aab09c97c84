//! Fluent API for building test configurations

use std::fs;
use std::path::PathBuf;
use storage_backup::config::Config;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder whose staging and log directories live in a temp dir
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log_directory");

        let mut config = Config::default();
        config.global.staging_directory = Some(temp_dir.path().join("dist"));
        config.global.log_directory = log_directory;

        Self { temp_dir, config }
    }

    /// Config with every remote setting filled in and a nightly schedule
    pub fn complete() -> Self {
        Self::new()
            .with_schedule("0 2 * * *")
            .with_source("https://project.supabase.co", "service-role-key", "uploads")
            .with_destination("archive", "eu-west-1")
            .with_webhook("https://hooks.slack.com/services/T000/B000/XXX")
    }

    pub fn with_schedule(mut self, schedule: &str) -> Self {
        self.config.global.schedule = schedule.to_string();
        self
    }

    pub fn with_source(mut self, url: &str, key: &str, bucket: &str) -> Self {
        self.config.source.url = url.to_string();
        self.config.source.service_role_key = key.to_string();
        self.config.source.bucket = bucket.to_string();
        self
    }

    pub fn with_destination(mut self, bucket: &str, region: &str) -> Self {
        self.config.destination.bucket = bucket.to_string();
        self.config.destination.region = region.to_string();
        self.config.destination.access_key_id = "AKIATEST".to_string();
        self.config.destination.secret_access_key = "secret".to_string();
        self
    }

    pub fn with_webhook(mut self, url: &str) -> Self {
        self.config.notifications.slack_webhook_url = url.to_string();
        self
    }

    pub fn with_page_sizes(mut self, folders: u32, files: u32) -> Self {
        self.config.source.folder_page_size = folders;
        self.config.source.file_page_size = files;
        self
    }

    /// Staging root of the config being built
    pub fn staging_root(&self) -> PathBuf {
        self.config.staging_root()
    }

    /// Build the config (temp dir is dropped)
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and keep the temp dir alive
    pub fn persist(self) -> (Config, TempDir) {
        (self.config, self.temp_dir)
    }

    /// Write the config as TOML and return its path with the temp dir
    pub fn write_toml(self) -> (PathBuf, TempDir) {
        let path = self.temp_dir.path().join("storage-backup.toml");
        let content = toml::to_string_pretty(&self.config).expect("Failed to serialize config");
        fs::write(&path, content).expect("Failed to write config file");
        (path, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
