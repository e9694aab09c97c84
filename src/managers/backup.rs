//! Backup manager - orchestrates one backup run
//!
//! A run is a short pipeline:
//!
//! 1. list the top-level folders of the source bucket
//! 2. enumerate every file under each folder
//! 3. for each file: sign → download to staging → upload to the destination
//! 4. notify
//!
//! Failures in steps 1-2 are fatal to the run and produce a single failure
//! notification. Failures in step 3 only skip the file they concern and are
//! recorded in the [`RunReport`].

use crate::config::Config;
use crate::managers::notification::{NotificationManager, Notifier};
use crate::utils::destination::{DestinationStorage, S3Destination};
use crate::utils::error::StorageError;
use crate::utils::fetch::{HttpFetcher, ObjectFetcher};
use crate::utils::locker::RunLock;
use crate::utils::paths;
use crate::utils::source::{self, SourceStorage, StorageEntry, SupabaseStorage};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Errors that abort a whole run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Error listing folders: {0}")]
    ListFolders(#[source] StorageError),

    #[error("No folders found in the bucket.")]
    NoFolders,

    #[error("Error while listing files in folder {folder}: {source}")]
    ListFiles {
        folder: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to acquire run lock: {0}")]
    Lock(#[source] std::io::Error),
}

/// A file found in the source bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Full path relative to the bucket root
    pub name: String,
}

/// Step at which a file was given up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipStage {
    SignedUrl,
    Download,
    Upload,
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipStage::SignedUrl => "signed URL",
            SkipStage::Download => "download",
            SkipStage::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub stage: SkipStage,
    pub reason: String,
}

impl SkippedFile {
    fn new(file: &FileRef, stage: SkipStage, reason: impl fmt::Display) -> Self {
        Self {
            name: file.name.clone(),
            stage,
            reason: reason.to_string(),
        }
    }
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub backup_folder: String,
    pub staging_dir: PathBuf,
    pub folders: usize,
    pub files_found: usize,
    /// Destination keys written
    pub uploaded: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

impl RunReport {
    fn new(backup_folder: &str, staging_dir: PathBuf) -> Self {
        Self {
            backup_folder: backup_folder.to_string(),
            staging_dir,
            folders: 0,
            files_found: 0,
            uploaded: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Fatal error; the message was sent in the failure notification
    Failed(String),
    /// Another run held the lock; nothing was done and nothing was sent
    Skipped,
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// External services used by a run
#[derive(Clone)]
pub struct BackupClients {
    pub source: Arc<dyn SourceStorage>,
    pub fetcher: Arc<dyn ObjectFetcher>,
    pub destination: Arc<dyn DestinationStorage>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct BackupManager {
    config: Config,
    clients: BackupClients,
}

impl BackupManager {
    /// Create backup manager with the real storage, HTTP and webhook clients
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let source = SupabaseStorage::new(&config.source)
            .context("Failed to create source storage client")?;
        let destination = S3Destination::new(&config.destination).await;
        let notifier = NotificationManager::new(config.notifications.clone())?;

        let clients = BackupClients {
            source: Arc::new(source),
            fetcher: Arc::new(HttpFetcher::new()),
            destination: Arc::new(destination),
            notifier: Arc::new(notifier),
        };

        Ok(Self::with_clients(config, clients))
    }

    /// Create backup manager with specific clients
    pub fn with_clients(config: Config, clients: BackupClients) -> Self {
        Self { config, clients }
    }

    /// Run a backup for today's date
    pub async fn run_backup(&self) -> RunOutcome {
        self.run_backup_on(Local::now().date_naive()).await
    }

    /// Run a backup into the folder named after `date`.
    ///
    /// Never returns an error: fatal failures are logged and notified here.
    pub async fn run_backup_on(&self, date: NaiveDate) -> RunOutcome {
        let staging_root = self.config.staging_root();

        let mut lock = match RunLock::open(&staging_root) {
            Ok(lock) => lock,
            Err(e) => return self.fail(RunError::Lock(e)).await,
        };
        let _guard = match lock.try_acquire() {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                warn!("A backup run is already in progress, skipping this one");
                return RunOutcome::Skipped;
            }
            Err(e) => return self.fail(RunError::Lock(e)).await,
        };

        let backup_folder = paths::backup_folder_name(date);
        let start_time = Instant::now();

        match self.execute(&backup_folder, &staging_root).await {
            Ok(report) => {
                info!(
                    "Backup '{}' finished in {:.2}s: {} uploaded, {} skipped, {} found",
                    backup_folder,
                    start_time.elapsed().as_secs_f64(),
                    report.uploaded.len(),
                    report.skipped.len(),
                    report.files_found
                );
                self.clients
                    .notifier
                    .send_notification(&format!(
                        "Backup completed successfully. Folder: {}",
                        backup_folder
                    ))
                    .await;
                RunOutcome::Completed(report)
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn fail(&self, error: RunError) -> RunOutcome {
        let message = error.to_string();
        error!("Backup run failed: {}", message);
        self.clients
            .notifier
            .send_notification(&format!("Backup failed. Error: {}", message))
            .await;
        RunOutcome::Failed(message)
    }

    async fn execute(&self, backup_folder: &str, staging_root: &Path) -> Result<RunReport, RunError> {
        let bucket = &self.config.source.bucket;
        info!("Using bucket: {}", bucket);

        let folders = self.list_folders().await?;
        info!("Found {} folders in bucket {}", folders.len(), bucket);

        let staging_dir = paths::staging_dir(staging_root, backup_folder);
        let mut report = RunReport::new(backup_folder, staging_dir.clone());

        for folder in &folders {
            info!("Processing folder: {}", folder.name);

            let files = self
                .list_files_recursively(folder.name.trim_end_matches('/'))
                .await?;
            report.folders += 1;

            if files.is_empty() {
                info!("No files found in folder: {}", folder.name);
                continue;
            }
            report.files_found += files.len();

            for file in &files {
                match self.process_file(file, backup_folder, &staging_dir).await {
                    Ok(key) => report.uploaded.push(key),
                    Err(skipped) => {
                        error!(
                            "Skipping {}: {} failed: {}",
                            skipped.name, skipped.stage, skipped.reason
                        );
                        report.skipped.push(skipped);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Top-level entries of the source bucket; an empty bucket is an error
    pub async fn list_folders(&self) -> Result<Vec<StorageEntry>, RunError> {
        let folders = source::list_all(
            self.clients.source.as_ref(),
            "",
            self.config.source.folder_page_size,
        )
        .await
        .map_err(RunError::ListFolders)?;

        if folders.is_empty() {
            return Err(RunError::NoFolders);
        }
        Ok(folders)
    }

    /// Depth-first enumeration of every file below `folder`.
    ///
    /// Sub-folders are expanded in place, so their files come before the
    /// siblings listed after them. Any listing error aborts the enumeration.
    pub fn list_files_recursively<'a>(
        &'a self,
        folder: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FileRef>, RunError>> {
        async move {
            let entries = source::list_all(
                self.clients.source.as_ref(),
                folder,
                self.config.source.file_page_size,
            )
            .await
            .map_err(|source| {
                error!("Error listing items in folder {}: {}", folder, source);
                RunError::ListFiles {
                    folder: folder.to_string(),
                    source,
                }
            })?;

            let mut files = Vec::new();
            for entry in entries {
                let path = paths::join_storage_path(folder, &entry.name);
                if entry.is_folder() {
                    files.extend(self.list_files_recursively(&path).await?);
                } else {
                    files.push(FileRef { name: path });
                }
            }
            Ok(files)
        }
        .boxed()
    }

    /// Sign, download and upload one file. Returns the destination key.
    async fn process_file(
        &self,
        file: &FileRef,
        backup_folder: &str,
        staging_dir: &Path,
    ) -> Result<String, SkippedFile> {
        info!("Processing file: {}", file.name);

        let signed_url = match self
            .clients
            .source
            .create_signed_url(&file.name, self.config.source.signed_url_expiry_secs)
            .await
        {
            Ok(Some(url)) => url,
            Ok(None) => {
                return Err(SkippedFile::new(
                    file,
                    SkipStage::SignedUrl,
                    StorageError::MissingSignedUrl(file.name.clone()),
                ))
            }
            Err(e) => return Err(SkippedFile::new(file, SkipStage::SignedUrl, e)),
        };
        debug!("Signed URL generated for file {}", file.name);

        tokio::fs::create_dir_all(staging_dir)
            .await
            .map_err(|e| SkippedFile::new(file, SkipStage::Download, e))?;

        let local_path = paths::staging_file(staging_dir, &file.name).ok_or_else(|| {
            SkippedFile::new(file, SkipStage::Download, "file name has no usable base name")
        })?;

        let size = self
            .clients
            .fetcher
            .download(&signed_url, &local_path)
            .await
            .map_err(|e| SkippedFile::new(file, SkipStage::Download, e))?;
        info!("Downloaded and saved {} ({} bytes)", file.name, size);

        let key = paths::destination_key(backup_folder, &file.name);
        self.clients
            .destination
            .put_object(&key, &local_path)
            .await
            .map_err(|e| SkippedFile::new(file, SkipStage::Upload, e))?;
        info!("File uploaded successfully: {}", key);

        Ok(key)
    }
}
