//! Source object storage client
//!
//! The backup reads from a Supabase Storage bucket through its REST API.
//! Access goes through the [`SourceStorage`] trait so tests can substitute an
//! in-memory bucket.

use super::error::StorageError;
use crate::config::SourceConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// One row of a bucket listing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageEntry {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl StorageEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            updated_at: None,
            metadata: None,
        }
    }

    /// Folder-like entries are named with a trailing separator
    pub fn is_folder(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Paging window for a listing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
}

/// Abstraction over the source bucket, enabling mocking in tests
#[async_trait]
pub trait SourceStorage: Send + Sync {
    /// List the entries directly under `prefix` (empty for the bucket root)
    async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StorageEntry>, StorageError>;

    /// Issue a temporary download URL; `None` if the API returned no URL
    async fn create_signed_url(
        &self,
        name: &str,
        expires_in_secs: u64,
    ) -> Result<Option<String>, StorageError>;
}

/// List every entry under `prefix`, page by page, until a short page is returned.
///
/// A full page that contains no entry seen before also ends the listing, so a
/// backend ignoring `offset` cannot keep the loop going forever.
pub async fn list_all(
    storage: &dyn SourceStorage,
    prefix: &str,
    page_size: u32,
) -> Result<Vec<StorageEntry>, StorageError> {
    let limit = page_size.max(1);
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = 0;

    loop {
        let page = storage.list(prefix, ListOptions { limit, offset }).await?;
        let page_len = page.len() as u32;
        let before = entries.len();
        for entry in page {
            if seen.insert(entry.name.clone()) {
                entries.push(entry);
            }
        }

        if page_len < limit {
            break;
        }
        if entries.len() == before {
            warn!(
                "Page at offset {} of '{}' repeated earlier entries, stopping pagination",
                offset, prefix
            );
            break;
        }
        offset += limit;
        debug!("Fetching next page of '{}' at offset {}", prefix, offset);
    }

    Ok(entries)
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Debug, Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Debug, Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", default)]
    signed_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Supabase Storage REST client
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(config: &SourceConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_role_key.clone(),
        })
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.storage_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    /// Turn a non-success response into an API error carrying its message
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body
                }
            });

        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SourceStorage for SupabaseStorage {
    async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StorageEntry>, StorageError> {
        let request = ListRequest {
            prefix,
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };

        let response = self
            .post(&format!("/object/list/{}", self.bucket))
            .json(&request)
            .send()
            .await?;

        let entries = Self::check(response).await?.json::<Vec<StorageEntry>>().await?;
        debug!(
            "Listed {} entries under '{}' (offset {})",
            entries.len(),
            prefix,
            options.offset
        );
        Ok(entries)
    }

    async fn create_signed_url(
        &self,
        name: &str,
        expires_in_secs: u64,
    ) -> Result<Option<String>, StorageError> {
        let response = self
            .post(&format!("/object/sign/{}/{}", self.bucket, name))
            .json(&SignRequest {
                expires_in: expires_in_secs,
            })
            .send()
            .await?;

        let signed = Self::check(response).await?.json::<SignResponse>().await?;

        // The API returns a path relative to the storage endpoint
        Ok(signed
            .signed_url
            .filter(|path| !path.is_empty())
            .map(|path| self.storage_url(&path)))
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Recorded operation call
    #[derive(Clone, Debug, PartialEq)]
    pub enum SourceCall {
        List { prefix: String, offset: u32 },
        Sign { name: String, expires_in_secs: u64 },
    }

    /// In-memory bucket keyed by listing prefix
    #[derive(Clone, Default)]
    pub struct MockSourceStorage {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<SourceCall>>>,
        /// Entries returned for each prefix
        pub listings: Arc<Mutex<HashMap<String, Vec<StorageEntry>>>>,
        /// Prefixes whose listing fails
        pub failing_listings: Arc<Mutex<HashSet<String>>>,
        /// Files whose signing fails
        pub failing_signs: Arc<Mutex<HashSet<String>>>,
        /// Files for which the API returns no URL
        pub missing_urls: Arc<Mutex<HashSet<String>>>,
        /// Serve the first page for every offset
        pub ignore_offset: Arc<Mutex<bool>>,
    }

    impl MockSourceStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the entries listed under a prefix
        pub fn with_listing(self, prefix: &str, names: &[&str]) -> Self {
            self.listings.lock().unwrap().insert(
                prefix.to_string(),
                names.iter().map(|n| StorageEntry::new(*n)).collect(),
            );
            self
        }

        /// Configure a listing to fail
        pub fn with_failing_listing(self, prefix: &str) -> Self {
            self.failing_listings.lock().unwrap().insert(prefix.to_string());
            self
        }

        /// Configure signing to fail for a file
        pub fn with_failing_sign(self, name: &str) -> Self {
            self.failing_signs.lock().unwrap().insert(name.to_string());
            self
        }

        /// Configure signing to return no URL for a file
        pub fn with_missing_url(self, name: &str) -> Self {
            self.missing_urls.lock().unwrap().insert(name.to_string());
            self
        }

        /// Answer every listing from offset 0
        pub fn with_offset_ignored(self) -> Self {
            *self.ignore_offset.lock().unwrap() = true;
            self
        }

        /// URL handed out for a file
        pub fn signed_url_for(name: &str) -> String {
            format!("https://storage.test/signed/{}", name)
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<SourceCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Names of files a signed URL was requested for
        pub fn signed_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    SourceCall::Sign { name, .. } => Some(name.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl SourceStorage for MockSourceStorage {
        async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StorageEntry>, StorageError> {
            self.calls.lock().unwrap().push(SourceCall::List {
                prefix: prefix.to_string(),
                offset: options.offset,
            });

            if self.failing_listings.lock().unwrap().contains(prefix) {
                return Err(StorageError::Api {
                    status: 400,
                    message: format!("mock listing failure for '{}'", prefix),
                });
            }

            let entries = self
                .listings
                .lock()
                .unwrap()
                .get(prefix)
                .cloned()
                .unwrap_or_default();

            let offset = if *self.ignore_offset.lock().unwrap() {
                0
            } else {
                options.offset as usize
            };

            Ok(entries
                .into_iter()
                .skip(offset)
                .take(options.limit as usize)
                .collect())
        }

        async fn create_signed_url(
            &self,
            name: &str,
            expires_in_secs: u64,
        ) -> Result<Option<String>, StorageError> {
            self.calls.lock().unwrap().push(SourceCall::Sign {
                name: name.to_string(),
                expires_in_secs,
            });

            if self.failing_signs.lock().unwrap().contains(name) {
                return Err(StorageError::Api {
                    status: 404,
                    message: "Object not found".to_string(),
                });
            }
            if self.missing_urls.lock().unwrap().contains(name) {
                return Ok(None);
            }

            Ok(Some(Self::signed_url_for(name)))
        }
    }
}
