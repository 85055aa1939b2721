//! Configuration for suite stores.

use crate::{LocalDirectoryBackend, ObjectStoreBackend, Result, StoreBackend, StoreError, SuiteStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default per-operation timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Which backend holds the documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// JSON files under a local directory
    Local {
        /// Root directory
        root: PathBuf,
    },

    /// Process-local in-memory store
    Memory,

    /// Amazon S3
    S3 {
        /// Bucket name
        bucket: String,
        /// Optional key prefix inside the bucket
        prefix: Option<String>,
        /// Optional AWS region
        region: Option<String>,
    },

    /// Google Cloud Storage
    Gcs {
        /// Bucket name
        bucket: String,
        /// Optional key prefix inside the bucket
        prefix: Option<String>,
    },

    /// Azure Blob Storage
    Azure {
        /// Storage account
        account: String,
        /// Container name
        container: String,
        /// Optional key prefix inside the container
        prefix: Option<String>,
    },
}

/// Configuration for a suite store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Backend configuration
    pub backend: BackendConfig,

    /// Per-operation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl StoreConfig {
    /// Creates a new builder for `StoreConfig`.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(StoreError::Configuration(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }

        match &self.backend {
            BackendConfig::Local { root } if root.as_os_str().is_empty() => Err(
                StoreError::Configuration("local root cannot be empty".to_string()),
            ),
            BackendConfig::S3 { bucket, .. } | BackendConfig::Gcs { bucket, .. }
                if bucket.is_empty() =>
            {
                Err(StoreError::Configuration(
                    "bucket cannot be empty".to_string(),
                ))
            }
            BackendConfig::Azure {
                account, container, ..
            } if account.is_empty() || container.is_empty() => Err(StoreError::Configuration(
                "account and container cannot be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Returns the per-operation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Opens the configured backend and wraps it in a `SuiteStore`.
    pub fn open(&self) -> Result<SuiteStore> {
        self.validate()?;
        let backend = open_backend(&self.backend)?;
        info!("Opened suite store on {}", backend.describe());
        Ok(SuiteStore::new(backend).with_timeout(self.timeout()))
    }
}

/// Instantiates the backend described by the configuration.
///
/// Cloud backends need their cargo feature (`s3`, `gcs`, `azure`).
pub fn open_backend(config: &BackendConfig) -> Result<Arc<dyn StoreBackend>> {
    match config {
        BackendConfig::Local { root } => Ok(Arc::new(LocalDirectoryBackend::new(root.clone()))),
        BackendConfig::Memory => Ok(Arc::new(ObjectStoreBackend::in_memory())),
        #[cfg(feature = "s3")]
        BackendConfig::S3 {
            bucket,
            prefix,
            region,
        } => Ok(Arc::new(
            ObjectStoreBackend::s3(bucket, region.as_deref())?
                .with_prefix(prefix.as_deref().unwrap_or(""))?,
        )),
        #[cfg(not(feature = "s3"))]
        BackendConfig::S3 { .. } => Err(StoreError::UnsupportedBackend(
            "S3 support not enabled. Enable the 's3' feature.".to_string(),
        )),
        #[cfg(feature = "gcs")]
        BackendConfig::Gcs { bucket, prefix } => Ok(Arc::new(
            ObjectStoreBackend::gcs(bucket)?.with_prefix(prefix.as_deref().unwrap_or(""))?,
        )),
        #[cfg(not(feature = "gcs"))]
        BackendConfig::Gcs { .. } => Err(StoreError::UnsupportedBackend(
            "GCS support not enabled. Enable the 'gcs' feature.".to_string(),
        )),
        #[cfg(feature = "azure")]
        BackendConfig::Azure {
            account,
            container,
            prefix,
        } => Ok(Arc::new(
            ObjectStoreBackend::azure(account, container)?
                .with_prefix(prefix.as_deref().unwrap_or(""))?,
        )),
        #[cfg(not(feature = "azure"))]
        BackendConfig::Azure { .. } => Err(StoreError::UnsupportedBackend(
            "Azure support not enabled. Enable the 'azure' feature.".to_string(),
        )),
    }
}

/// Builder for `StoreConfig`.
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    backend: Option<BackendConfig>,
    timeout_ms: Option<u64>,
}

impl StoreConfigBuilder {
    /// Sets the backend to a local directory.
    pub fn local(mut self, root: impl Into<PathBuf>) -> Self {
        self.backend = Some(BackendConfig::Local { root: root.into() });
        self
    }

    /// Sets the backend to a process-local in-memory store.
    pub fn memory(mut self) -> Self {
        self.backend = Some(BackendConfig::Memory);
        self
    }

    /// Sets the backend to an S3 bucket.
    pub fn s3<S: Into<String>>(mut self, bucket: S) -> Self {
        self.backend = Some(BackendConfig::S3 {
            bucket: bucket.into(),
            prefix: None,
            region: None,
        });
        self
    }

    /// Sets the backend to an S3 bucket with additional options.
    pub fn s3_with_options<S: Into<String>>(
        mut self,
        bucket: S,
        prefix: Option<String>,
        region: Option<String>,
    ) -> Self {
        self.backend = Some(BackendConfig::S3 {
            bucket: bucket.into(),
            prefix,
            region,
        });
        self
    }

    /// Sets the backend to a GCS bucket.
    pub fn gcs<S: Into<String>>(mut self, bucket: S, prefix: Option<String>) -> Self {
        self.backend = Some(BackendConfig::Gcs {
            bucket: bucket.into(),
            prefix,
        });
        self
    }

    /// Sets the backend to an Azure Blob Storage container.
    pub fn azure<S: Into<String>>(mut self, account: S, container: S, prefix: Option<String>) -> Self {
        self.backend = Some(BackendConfig::Azure {
            account: account.into(),
            container: container.into(),
            prefix,
        });
        self
    }

    /// Sets the backend directly.
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the per-operation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Builds the `StoreConfig`.
    ///
    /// Returns an error if the backend is missing or the configuration is
    /// invalid.
    pub fn build(self) -> Result<StoreConfig> {
        let config = StoreConfig {
            backend: self.backend.ok_or_else(|| {
                StoreError::Configuration("backend is required".to_string())
            })?,
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_builder_local() {
        let config = StoreConfig::builder()
            .local("/var/lib/dxe")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(
            config.backend,
            BackendConfig::Local {
                root: PathBuf::from("/var/lib/dxe")
            }
        );
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder_defaults_timeout() {
        let config = StoreConfig::builder().memory().build().unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_config_builder_s3() {
        let config = StoreConfig::builder()
            .s3_with_options(
                "quality-bucket",
                Some("suites".to_string()),
                Some("eu-west-1".to_string()),
            )
            .build()
            .unwrap();
        assert!(matches!(config.backend, BackendConfig::S3 { .. }));
    }

    #[test]
    fn test_config_builder_missing_backend() {
        let result = StoreConfig::builder().build();
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_config_validation() {
        assert!(StoreConfig::builder().s3("").build().is_err());
        assert!(StoreConfig::builder().gcs("", None).build().is_err());
        assert!(StoreConfig::builder().azure("acct", "", None).build().is_err());
        assert!(StoreConfig::builder().local("").build().is_err());
        assert!(
            StoreConfig::builder()
                .memory()
                .timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_config_serde() {
        let config: StoreConfig = serde_json::from_str(
            r#"{"backend": {"type": "s3", "bucket": "quality", "region": "us-east-1"}}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(
            config.backend,
            BackendConfig::S3 {
                bucket: "quality".to_string(),
                prefix: None,
                region: Some("us-east-1".to_string()),
            }
        );
    }

    #[cfg(not(feature = "s3"))]
    #[test]
    fn test_disabled_backend_is_unsupported() {
        let config = StoreConfig::builder().s3("quality").build().unwrap();
        assert!(matches!(
            config.open(),
            Err(StoreError::UnsupportedBackend(_))
        ));
    }
}
