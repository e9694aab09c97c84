//! Test context wiring mock clients into a backup manager

use crate::config_builder::ConfigBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage_backup::config::Config;
use storage_backup::managers::backup::{BackupClients, BackupManager};
use storage_backup::managers::notification::mock::MockNotifier;
use storage_backup::utils::destination::mock::MockDestination;
use storage_backup::utils::fetch::mock::MockFetcher;
use storage_backup::utils::source::mock::MockSourceStorage;
use tempfile::TempDir;

/// Owns a temp dir, a config pointing into it, and the mocks a run talks to
pub struct TestContext {
    temp_dir: TempDir,
    config: Config,
    pub source: MockSourceStorage,
    pub fetcher: MockFetcher,
    pub destination: MockDestination,
    pub notifier: MockNotifier,
}

impl TestContext {
    /// Context with an empty bucket and a complete configuration
    pub fn new() -> Self {
        Self::from_builder(ConfigBuilder::complete())
    }

    pub fn from_builder(builder: ConfigBuilder) -> Self {
        let (config, temp_dir) = builder.persist();
        Self {
            temp_dir,
            config,
            source: MockSourceStorage::new(),
            fetcher: MockFetcher::new(),
            destination: MockDestination::new(),
            notifier: MockNotifier::new(),
        }
    }

    pub fn with_source(mut self, source: MockSourceStorage) -> Self {
        self.source = source;
        self
    }

    pub fn with_fetcher(mut self, fetcher: MockFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_destination(mut self, destination: MockDestination) -> Self {
        self.destination = destination;
        self
    }

    /// Backup manager sharing this context's mocks
    pub fn manager(&self) -> BackupManager {
        let clients = BackupClients {
            source: Arc::new(self.source.clone()),
            fetcher: Arc::new(self.fetcher.clone()),
            destination: Arc::new(self.destination.clone()),
            notifier: Arc::new(self.notifier.clone()),
        };
        BackupManager::with_clients(self.config.clone(), clients)
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Staging directory a run on `backup_folder` writes to
    pub fn staging_dir(&self, backup_folder: &str) -> PathBuf {
        self.config.staging_root().join(backup_folder)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
