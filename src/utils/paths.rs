//! Naming helpers for storage paths, staging files and destination keys

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Suffix appended to the date of every backup folder
pub const BACKUP_FOLDER_SUFFIX: &str = "storage-backup";

/// `YYYY-MM-DD-storage-backup` for the given date
pub fn backup_folder_name(date: NaiveDate) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), BACKUP_FOLDER_SUFFIX)
}

/// Join a listing prefix and an entry name into a fully-qualified storage path.
///
/// The root prefix is empty, so top-level names carry no leading separator.
/// Trailing separators are stripped from the result.
pub fn join_storage_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    let joined = if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    };
    joined.trim_end_matches('/').to_string()
}

/// Last path segment of a storage name
pub fn base_name(name: &str) -> &str {
    name.trim_end_matches('/').rsplit('/').next().unwrap_or(name)
}

/// Key of a file inside the destination bucket; keeps the full source path
pub fn destination_key(backup_folder: &str, file_name: &str) -> String {
    format!("{}/{}", backup_folder, file_name)
}

/// Per-run staging directory
pub fn staging_dir(staging_root: &Path, backup_folder: &str) -> PathBuf {
    staging_root.join(backup_folder)
}

/// Local file a download is written to (base name only, so nested files with
/// the same base name overwrite each other).
///
/// Returns `None` when the base name cannot be used as a file name.
pub fn staging_file(staging_dir: &Path, file_name: &str) -> Option<PathBuf> {
    match base_name(file_name) {
        "" | "." | ".." => None,
        base => Some(staging_dir.join(base)),
    }
}
