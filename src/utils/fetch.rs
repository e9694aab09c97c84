//! Download of signed URLs into staging files

use super::error::StorageError;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Abstraction for fetching a URL to disk, enabling mocking in tests
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Stream the body of `url` into `destination`, returning the bytes written.
    ///
    /// A non-success status is an error and leaves `destination` untouched.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, StorageError>;
}

/// Fetcher backed by reqwest
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectFetcher for HttpFetcher {
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, StorageError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::from_status(status));
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {:?}", written, destination);
        Ok(written)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Serves configured bodies by URL; unknown URLs answer with empty bodies
    #[derive(Clone, Default)]
    pub struct MockFetcher {
        /// URLs fetched, in order
        pub fetched: Arc<Mutex<Vec<String>>>,
        /// Body returned per URL
        pub bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        /// URLs answering 404
        pub failing: Arc<Mutex<HashSet<String>>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the body served for a URL
        pub fn with_body(self, url: &str, body: &[u8]) -> Self {
            self.bodies.lock().unwrap().insert(url.to_string(), body.to_vec());
            self
        }

        /// Configure a URL to answer with a non-success status
        pub fn with_failing_url(self, url: &str) -> Self {
            self.failing.lock().unwrap().insert(url.to_string());
            self
        }

        pub fn fetched_urls(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectFetcher for MockFetcher {
        async fn download(&self, url: &str, destination: &Path) -> Result<u64, StorageError> {
            self.fetched.lock().unwrap().push(url.to_string());

            if self.failing.lock().unwrap().contains(url) {
                return Err(StorageError::HttpStatus {
                    status: 404,
                    reason: "Not Found".to_string(),
                });
            }

            let body = self
                .bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_default();
            tokio::fs::write(destination, &body).await?;
            Ok(body.len() as u64)
        }
    }
}
