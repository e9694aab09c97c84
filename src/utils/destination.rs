//! Destination bucket client

use super::error::StorageError;
use crate::config::DestinationConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::info;

/// Abstraction over the destination bucket, enabling mocking in tests
#[async_trait]
pub trait DestinationStorage: Send + Sync {
    /// Upload the file at `path` under `key`
    async fn put_object(&self, key: &str, path: &Path) -> Result<(), StorageError>;
}

/// S3 (or S3-compatible) destination with static credentials
pub struct S3Destination {
    client: Client,
    bucket: String,
}

impl S3Destination {
    pub async fn new(config: &DestinationConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "storage-backup",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl DestinationStorage for S3Destination {
    async fn put_object(&self, key: &str, path: &Path) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(e).to_string()))?;

        info!(bucket = %self.bucket, key = %key, "Uploaded object");
        Ok(())
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Uploaded object with the bytes read from the staging file
    #[derive(Clone, Debug, PartialEq)]
    pub struct UploadedObject {
        pub key: String,
        pub source_path: std::path::PathBuf,
        pub body: Vec<u8>,
    }

    #[derive(Clone, Default)]
    pub struct MockDestination {
        /// Successful uploads, in order
        pub uploads: Arc<Mutex<Vec<UploadedObject>>>,
        /// Keys whose upload fails
        pub failing_keys: Arc<Mutex<HashSet<String>>>,
    }

    impl MockDestination {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure an upload to fail
        pub fn with_failing_key(self, key: &str) -> Self {
            self.failing_keys.lock().unwrap().insert(key.to_string());
            self
        }

        pub fn uploaded_keys(&self) -> Vec<String> {
            self.uploads.lock().unwrap().iter().map(|u| u.key.clone()).collect()
        }

        pub fn get_uploads(&self) -> Vec<UploadedObject> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DestinationStorage for MockDestination {
        async fn put_object(&self, key: &str, path: &Path) -> Result<(), StorageError> {
            if self.failing_keys.lock().unwrap().contains(key) {
                return Err(StorageError::Upload(format!("AccessDenied for {}", key)));
            }

            let body = tokio::fs::read(path).await?;
            self.uploads.lock().unwrap().push(UploadedObject {
                key: key.to_string(),
                source_path: path.to_path_buf(),
                body,
            });
            Ok(())
        }
    }
}
