//! Storage Backup Library
//!
//! Copies every object of a Supabase Storage bucket into an S3 bucket under a
//! date-stamped prefix, on a cron schedule, and reports each run to Slack.

pub mod config;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, validate_config, Config};
pub use managers::backup::{BackupClients, BackupManager, RunOutcome, RunReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::notification::{NotificationManager, Notifier};
pub use managers::scheduler::Scheduler;
