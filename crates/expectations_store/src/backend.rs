//! Storage backend interface.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for implementing document storage backends.
///
/// Keys are `/`-separated strings validated by
/// [`validate_key`](crate::validate_key). Every operation is a discrete
/// future: callers bound it with a timeout and may cancel it by dropping it.
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl StoreBackend for MyBackend {
///     async fn save(&self, key: &str, document: &Value) -> Result<()> { ... }
///     async fn load(&self, key: &str) -> Result<Value> { ... }
///     async fn delete(&self, key: &str) -> Result<()> { ... }
///     async fn list(&self, prefix: &str) -> Result<Vec<String>> { ... }
///     fn describe(&self) -> String { "my backend".to_string() }
/// }
/// ```
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Stores a document, replacing whatever the key held.
    async fn save(&self, key: &str, document: &Value) -> Result<()>;

    /// Loads the document stored under the key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key holds nothing.
    async fn load(&self, key: &str) -> Result<Value>;

    /// Deletes the document stored under the key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key holds nothing.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Lists the keys under a prefix, sorted. Prefixes match whole segments.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;
}
