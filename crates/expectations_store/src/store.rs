//! Typed suite and result persistence over a backend.

use crate::keys::{validate_key, validate_prefix};
use crate::{DEFAULT_TIMEOUT_MS, Result, StoreBackend, StoreError};
use expectations_core::{ExpectationSuite, ValidationResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How saving a suite treats the snapshot already stored under the key.
#[derive(Debug, Clone, Copy, Default)]
pub enum SavePolicy<'a> {
    /// Replace the stored snapshot.
    #[default]
    Overwrite,

    /// Keep assertions that the new suite drops but that failed in the given
    /// result, so a failing check cannot vanish by being deleted from the
    /// suite. Retained assertions are appended in their stored order.
    PreserveFailed(&'a ValidationResult),
}

/// Persists suites and validation results through a [`StoreBackend`].
///
/// Every backend call is bounded by the store timeout; a call that does not
/// finish in time fails with `StoreError::Unavailable`.
///
/// # Example
///
/// ```rust
/// use expectations_store::{ObjectStoreBackend, SuiteStore};
/// use expectations_core::ExpectationSuite;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = SuiteStore::new(Arc::new(ObjectStoreBackend::in_memory()));
/// let suite = ExpectationSuite::new("yellow_trips");
///
/// store.save_suite("expectations/yellow_trips", &suite).await.unwrap();
/// assert_eq!(store.load_suite("expectations/yellow_trips").await.unwrap(), suite);
/// # }
/// ```
#[derive(Clone)]
pub struct SuiteStore {
    backend: Arc<dyn StoreBackend>,
    timeout: Duration,
}

impl SuiteStore {
    /// Wraps a backend with the default timeout.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Sets the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    /// Saves a suite, replacing any stored snapshot.
    pub async fn save_suite(&self, key: &str, suite: &ExpectationSuite) -> Result<()> {
        self.save_suite_with(key, suite, &SavePolicy::Overwrite)
            .await
            .map(|_| ())
    }

    /// Saves a suite under the given policy and returns the stored snapshot.
    pub async fn save_suite_with(
        &self,
        key: &str,
        suite: &ExpectationSuite,
        policy: &SavePolicy<'_>,
    ) -> Result<ExpectationSuite> {
        validate_key(key)?;
        let mut snapshot = suite.clone();

        if let SavePolicy::PreserveFailed(result) = policy {
            match self.load_suite(key).await {
                Ok(previous) => {
                    let retained = snapshot.retain_from(&previous, |config| {
                        result.outcome_for(config).is_some_and(|o| !o.success)
                    });
                    if retained > 0 {
                        warn!(
                            "Keeping {} failed assertion(s) that suite '{}' dropped",
                            retained, suite.name
                        );
                    }
                }
                Err(StoreError::NotFound(_)) => {
                    debug!("Nothing stored under '{}', nothing to preserve", key);
                }
                Err(err) => return Err(err),
            }
        }

        self.put(key, &snapshot).await?;
        info!(
            "Saved suite '{}' ({} assertions) under '{}'",
            snapshot.name,
            snapshot.len(),
            key
        );
        Ok(snapshot)
    }

    /// Loads a suite. Each call returns a fresh, independently mutable copy.
    pub async fn load_suite(&self, key: &str) -> Result<ExpectationSuite> {
        self.get(key).await
    }

    /// Saves a validation result.
    pub async fn save_result(&self, key: &str, result: &ValidationResult) -> Result<()> {
        self.put(key, result).await?;
        info!("Saved validation result for '{}' under '{}'", result.suite_name, key);
        Ok(())
    }

    /// Loads a validation result.
    pub async fn load_result(&self, key: &str) -> Result<ValidationResult> {
        self.get(key).await
    }

    /// Lists the stored keys under a prefix, sorted.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        validate_prefix(prefix)?;
        self.bounded("list", self.backend.list(prefix)).await
    }

    /// Deletes the document stored under the key.
    pub async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.bounded("delete", self.backend.delete(key)).await?;
        info!("Deleted '{}'", key);
        Ok(())
    }

    async fn put<T: Serialize>(&self, key: &str, document: &T) -> Result<()> {
        validate_key(key)?;
        let value = serde_json::to_value(document)?;
        self.bounded("save", self.backend.save(key, &value)).await
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        validate_key(key)?;
        let value = self.bounded("load", self.backend.load(key)).await?;
        serde_json::from_value(value).map_err(|e| {
            StoreError::Serialization(format!("document under '{}' is malformed: {}", key, e))
        })
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::unavailable(
                self.backend.describe(),
                format!("{} timed out after {:?}", operation, self.timeout),
            )),
        }
    }
}

impl std::fmt::Debug for SuiteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteStore")
            .field("backend", &self.backend.describe())
            .field("timeout", &self.timeout)
            .finish()
    }
}
