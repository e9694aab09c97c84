//! Long-running cron loop that triggers backup runs

use crate::config::ConfigError;
use crate::managers::backup::{BackupManager, RunOutcome};
use crate::utils::cron;
use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;
use tracing::{info, warn};

pub struct Scheduler {
    expression: String,
    schedule: ::cron::Schedule,
}

impl Scheduler {
    pub fn new(expression: &str) -> Result<Self, ConfigError> {
        let schedule = cron::parse_schedule(expression)?;
        Ok(Self {
            expression: expression.trim().to_string(),
            schedule,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Next trigger after `now`
    pub fn next_fire<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        cron::next_fire_after(&self.schedule, now)
    }

    /// Time to wait from `now` until the next trigger
    pub fn delay_until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Duration> {
        let next = self.next_fire(now)?;
        Some(
            next.signed_duration_since(now.clone())
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Wait from `now` until the next trigger, then run one backup.
    ///
    /// Returns `None` without running when the schedule has no upcoming trigger.
    pub async fn run_next<Tz: TimeZone>(
        &self,
        manager: &BackupManager,
        now: DateTime<Tz>,
    ) -> Option<RunOutcome> {
        let next = self.next_fire(&now)?;
        let delay = self.delay_until_next(&now).unwrap_or(Duration::ZERO);
        info!("Next backup at {}", next.naive_local().format("%Y-%m-%d %H:%M:%S"));

        tokio::time::sleep(delay).await;

        let outcome = manager.run_backup().await;
        log_outcome(&outcome);
        Some(outcome)
    }

    /// Fire backups until Ctrl-C.
    ///
    /// Each run is awaited before the next trigger is computed, so runs
    /// never overlap within this process; a trigger that falls inside a
    /// long run is simply missed.
    pub async fn run(&self, manager: &BackupManager) {
        info!("Backup scheduler started with schedule '{}'", self.expression);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                outcome = self.run_next(manager, Local::now()) => {
                    if outcome.is_none() {
                        warn!("Schedule '{}' has no upcoming trigger, stopping", self.expression);
                        return;
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    return;
                }
            }
        }
    }
}

fn log_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(report) => info!(
            "Scheduled backup '{}' completed ({} files uploaded)",
            report.backup_folder,
            report.uploaded.len()
        ),
        RunOutcome::Failed(message) => warn!("Scheduled backup failed: {}", message),
        RunOutcome::Skipped => info!("Scheduled backup skipped"),
    }
}
