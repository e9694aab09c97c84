//! Test fixtures and sample buckets

use chrono::NaiveDate;
use storage_backup::utils::source::mock::MockSourceStorage;

/// Date used for deterministic backup folder names
pub fn backup_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

/// Backup folder name for [`backup_date`]
pub const BACKUP_FOLDER: &str = "2024-01-01-storage-backup";

/// Bucket shaped `{a/: {b/: {c.txt}}, d.txt}` at the root
pub fn nested_tree() -> MockSourceStorage {
    MockSourceStorage::new()
        .with_listing("", &["a/", "d.txt"])
        .with_listing("a", &["b/"])
        .with_listing("a/b", &["c.txt"])
}

/// Two top-level folders with a nested sub-folder:
///
/// ```text
/// photos/img1.png
/// photos/raw/img1.cr2
/// docs/report.pdf
/// ```
pub fn photo_bucket() -> MockSourceStorage {
    MockSourceStorage::new()
        .with_listing("", &["photos", "docs"])
        .with_listing("photos", &["img1.png", "raw/"])
        .with_listing("photos/raw", &["img1.cr2"])
        .with_listing("docs", &["report.pdf"])
}

/// Single folder holding `count` files named `file000.bin`, `file001.bin`, ...
pub fn wide_folder(folder: &str, count: usize) -> MockSourceStorage {
    let names: Vec<String> = (0..count).map(|i| format!("file{:03}.bin", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    MockSourceStorage::new()
        .with_listing("", &[folder])
        .with_listing(folder, &refs)
}
