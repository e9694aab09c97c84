//! Unit tests for cron handling

use chrono::{NaiveDate, TimeZone, Utc};
use std::time::Duration;
use storage_backup::managers::scheduler::Scheduler;
use storage_backup::utils::paths::backup_folder_name;

#[test]
fn test_five_field_schedule_fires_on_the_minute() {
    let scheduler = Scheduler::new("0 3 * * *").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();

    let next = scheduler.next_fire(&now).unwrap();

    assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 3, 0, 0).unwrap());
}

#[test]
fn test_six_field_schedule_is_accepted() {
    let scheduler = Scheduler::new("30 */5 * * * *").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();

    assert_eq!(
        scheduler.delay_until_next(&now),
        Some(Duration::from_secs(30))
    );
}

#[test]
fn test_consecutive_fires_on_the_same_day_share_a_folder() {
    let scheduler = Scheduler::new("0 */6 * * *").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();

    let first = scheduler.next_fire(&now).unwrap();
    let second = scheduler.next_fire(&first).unwrap();

    assert_eq!(
        backup_folder_name(first.date_naive()),
        backup_folder_name(second.date_naive())
    );
    assert_eq!(
        backup_folder_name(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        "2024-01-01-storage-backup"
    );
}
