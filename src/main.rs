use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storage_backup::config::{self, Config};
use storage_backup::managers::logging::{self, LoggingConfig};
use storage_backup::{BackupManager, RunOutcome, Scheduler};

#[derive(Parser)]
#[command(name = "storage-backup")]
#[command(about = "Scheduled backup of a Supabase Storage bucket into S3", long_about = None)]
#[command(version)]
struct Cli {
    /// Optional TOML configuration file (environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run backups on the configured cron schedule (default)
    Daemon,

    /// Run a single backup now and exit
    Run,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    config::load_env_file(cli.env_file.as_deref())?;

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Daemon) {
        Commands::Daemon => {
            config::validate_config(&config)?;
            let _log_guard = logging::init_logging(&LoggingConfig::from_global(&config.global))?;

            let scheduler = Scheduler::new(&config.global.schedule)?;
            let manager = BackupManager::new(config).await?;
            scheduler.run(&manager).await;
        }

        Commands::Run => {
            let _log_guard = logging::init_logging(&LoggingConfig::from_global(&config.global))?;

            let manager = BackupManager::new(config).await?;
            match manager.run_backup().await {
                RunOutcome::Completed(report) => {
                    println!("✓ Backup completed: {}", report.backup_folder);
                    println!("  Folders:  {}", report.folders);
                    println!("  Uploaded: {}/{}", report.uploaded.len(), report.files_found);
                    for skipped in &report.skipped {
                        println!("  Skipped {} ({}): {}", skipped.name, skipped.stage, skipped.reason);
                    }
                }
                RunOutcome::Skipped => {
                    println!("Another backup run is in progress, nothing to do");
                }
                RunOutcome::Failed(message) => {
                    anyhow::bail!("Backup failed: {}", message);
                }
            }
        }

        Commands::Validate => {
            logging::init_console_logging();
            handle_validate(&config)?;
        }
    }

    Ok(())
}

/// Handle validate command
fn handle_validate(config: &Config) -> Result<()> {
    config::validate_config(config)?;

    println!("Configuration is valid!");
    println!("Schedule: {}", config.global.schedule);
    println!("Source bucket: {}", display_or_unset(&config.source.bucket));
    println!("Destination bucket: {}", display_or_unset(&config.destination.bucket));
    println!("Staging directory: {}", config.staging_root().display());

    let missing = config::missing_values(config);
    if !missing.is_empty() {
        println!();
        println!("⚠️  These settings are empty and the first call needing them will fail:");
        for name in missing {
            println!("  - {}", name);
        }
    }

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
