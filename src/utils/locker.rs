//! File-based locking to prevent overlapping backup runs

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const LOCK_FILE_NAME: &str = ".storage-backup.lock";

/// Lock file shared by every run using the same staging root
pub struct RunLock {
    lock: RwLock<File>,
    lock_path: PathBuf,
}

impl RunLock {
    /// Open (creating if needed) the lock file inside `dir`
    pub fn open(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let lock_path = dir.join(LOCK_FILE_NAME);

        debug!("Opening run lock: {:?}", lock_path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        Ok(Self {
            lock: RwLock::new(file),
            lock_path,
        })
    }

    /// Try to take the exclusive lock without blocking.
    /// Returns `Ok(None)` when another run holds it.
    pub fn try_acquire(&mut self) -> io::Result<Option<RunLockGuard<'_>>> {
        match self.lock.try_write() {
            Ok(guard) => {
                info!("Acquired backup run lock: {:?}", self.lock_path);
                Ok(Some(RunLockGuard {
                    _guard: guard,
                    lock_path: &self.lock_path,
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the lock file path
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

/// Held for the duration of a run; released on drop
pub struct RunLockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
    lock_path: &'a Path,
}

impl Drop for RunLockGuard<'_> {
    fn drop(&mut self) {
        info!("Released backup run lock: {:?}", self.lock_path);
    }
}
