//! Error type shared by the storage, fetch and upload clients

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Storage API answered with a non-success status
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// Plain HTTP failure where no API error body is expected
    #[error("Status: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Signed URL not available for file: {0}")]
    MissingSignedUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl StorageError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        StorageError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
