//! Test utilities for storage-backup
//!
//! This crate provides shared test utilities, builders for configurations
//! and a harness wiring the in-memory client mocks into a `BackupManager`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{fixtures, TestContext};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let ctx = TestContext::new().with_source(fixtures::nested_tree());
//!     let outcome = ctx.manager().run_backup_on(fixtures::backup_date()).await;
//!     assert_eq!(ctx.notifier.get_messages().len(), 1);
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use test_context::TestContext;

// Re-export types from the main crate for convenience
pub use storage_backup::config::{
    Config, DestinationConfig, GlobalConfig, NotificationConfig, SourceConfig,
};
pub use storage_backup::managers::backup::{
    BackupClients, BackupManager, FileRef, RunError, RunOutcome, RunReport, SkipStage,
    SkippedFile,
};

// Re-export mock implementations from the main crate
pub use storage_backup::managers::notification::mock::MockNotifier;
pub use storage_backup::utils::destination::mock::{MockDestination, UploadedObject};
pub use storage_backup::utils::fetch::mock::MockFetcher;
pub use storage_backup::utils::source::mock::{MockSourceStorage, SourceCall};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
