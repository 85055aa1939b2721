//! Object store backend (in-memory, S3, GCS, Azure).

use crate::keys::{validate_key, validate_prefix};
use crate::{Result, StoreBackend, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "s3")]
use object_store::aws::AmazonS3Builder;

#[cfg(feature = "gcs")]
use object_store::gcp::GoogleCloudStorageBuilder;

#[cfg(feature = "azure")]
use object_store::azure::MicrosoftAzureBuilder;

#[cfg(any(feature = "s3", feature = "gcs", feature = "azure"))]
use object_store::RetryConfig;

const SUFFIX: &str = ".json";

/// Stores each document as a JSON object in any `ObjectStore`.
///
/// The key `expectations/yellow_trips` maps to the object
/// `<prefix>/expectations/yellow_trips.json`.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    prefix: Vec<String>,
    name: String,
}

impl ObjectStoreBackend {
    /// Wraps an object store. `name` identifies it in logs and errors.
    pub fn new(store: Arc<dyn ObjectStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            prefix: Vec::new(),
            name: name.into(),
        }
    }

    /// A process-local in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }

    /// Places every document under a key prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self> {
        self.prefix = validate_prefix(prefix)?
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(self)
    }

    /// Connects to an S3 bucket. Credentials come from the environment.
    #[cfg(feature = "s3")]
    pub fn s3(bucket: &str, region: Option<&str>) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_retry(retry_config());
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        let store = builder.build().map_err(|e| {
            StoreError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;
        Ok(Self::new(Arc::new(store), format!("s3://{}", bucket)))
    }

    /// Connects to a GCS bucket. Credentials come from the environment.
    #[cfg(feature = "gcs")]
    pub fn gcs(bucket: &str) -> Result<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .with_retry(retry_config())
            .build()
            .map_err(|e| {
                StoreError::Configuration(format!("Failed to create GCS client: {}", e))
            })?;
        Ok(Self::new(Arc::new(store), format!("gs://{}", bucket)))
    }

    /// Connects to an Azure Blob Storage container. Credentials come from
    /// the environment.
    #[cfg(feature = "azure")]
    pub fn azure(account: &str, container: &str) -> Result<Self> {
        let store = MicrosoftAzureBuilder::from_env()
            .with_account(account)
            .with_container_name(container)
            .with_retry(retry_config())
            .build()
            .map_err(|e| {
                StoreError::Configuration(format!("Failed to create Azure client: {}", e))
            })?;
        Ok(Self::new(
            Arc::new(store),
            format!("az://{}/{}", account, container),
        ))
    }

    fn location(&self, key: &str) -> Result<Path> {
        let segments = validate_key(key)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        let file = format!("{}{}", last, SUFFIX);
        Ok(self
            .prefix
            .iter()
            .map(String::as_str)
            .chain(parents.iter().copied())
            .chain(std::iter::once(file.as_str()))
            .collect())
    }

    fn key_for(&self, location: &Path) -> Option<String> {
        let mut parts: Vec<String> = location.parts().map(|p| p.as_ref().to_string()).collect();
        if parts.len() <= self.prefix.len() || parts[..self.prefix.len()] != self.prefix[..] {
            return None;
        }
        let last = parts.pop()?;
        let name = last.strip_suffix(SUFFIX)?;
        parts.push(name.to_string());
        Some(parts[self.prefix.len()..].join("/"))
    }

    fn map_err(&self, key: &str, err: object_store::Error) -> StoreError {
        match err {
            object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
            other => StoreError::unavailable(self.describe(), other.to_string()),
        }
    }
}

#[cfg(any(feature = "s3", feature = "gcs", feature = "azure"))]
fn retry_config() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        retry_timeout: std::time::Duration::from_secs(30),
        ..Default::default()
    }
}

#[async_trait]
impl StoreBackend for ObjectStoreBackend {
    async fn save(&self, key: &str, document: &Value) -> Result<()> {
        let location = self.location(key)?;
        let bytes = serde_json::to_vec_pretty(document)?;
        self.store
            .put(&location, PutPayload::from(bytes))
            .await
            .map_err(|e| self.map_err(key, e))?;
        debug!("Saved '{}' to {}/{}", key, self.name, location);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Value> {
        let location = self.location(key)?;
        let bytes = self
            .store
            .get(&location)
            .await
            .map_err(|e| self.map_err(key, e))?
            .bytes()
            .await
            .map_err(|e| self.map_err(key, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let location = self.location(key)?;
        // Some stores treat deleting a missing object as success.
        self.store
            .head(&location)
            .await
            .map_err(|e| self.map_err(key, e))?;
        self.store
            .delete(&location)
            .await
            .map_err(|e| self.map_err(key, e))?;
        debug!("Deleted '{}' from {}", key, self.name);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix_path: Path = self
            .prefix
            .iter()
            .map(String::as_str)
            .chain(validate_prefix(prefix)?)
            .collect();
        let scope = (!prefix_path.as_ref().is_empty()).then_some(&prefix_path);
        let objects: Vec<_> = self
            .store
            .list(scope)
            .try_collect()
            .await
            .map_err(|e| self.map_err(prefix, e))?;

        let mut keys: Vec<String> = objects
            .iter()
            .filter_map(|meta| self.key_for(&meta.location))
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("object store {}", self.name)
    }
}
