//! Persistence for expectation suites and validation results.
//!
//! Suites and results are stored as JSON documents under flat string keys
//! (`expectations/yellow_trips`, `validations/yellow_trips/20240201T060000.000Z`).
//! Backends implement the narrow [`StoreBackend`] interface; [`SuiteStore`]
//! adds typed documents, per-operation timeouts and the save merge policy.
//!
//! # Example
//!
//! ```no_run
//! use expectations_store::{StoreConfig, suite_key};
//! use expectations_core::ExpectationSuite;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::builder()
//!     .local("great_expectations/stores")
//!     .build()?;
//! let store = config.open()?;
//!
//! let suite = ExpectationSuite::new("yellow_trips");
//! store.save_suite(&suite_key(&suite.name), &suite).await?;
//!
//! let loaded = store.load_suite("expectations/yellow_trips").await?;
//! assert_eq!(loaded, suite);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod backend;
mod config;
mod keys;
mod local;
mod object;
mod store;

pub use backend::StoreBackend;
pub use config::{BackendConfig, DEFAULT_TIMEOUT_MS, StoreConfig, StoreConfigBuilder, open_backend};
pub use keys::{RESULT_PREFIX, SUITE_PREFIX, result_key, suite_key, validate_key};
pub use local::LocalDirectoryBackend;
pub use object::ObjectStoreBackend;
pub use store::{SavePolicy, SuiteStore};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types specific to store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing is stored under the key
    #[error("No document stored under key '{0}'")]
    NotFound(String),

    /// The backend failed or did not answer in time
    #[error("Store backend {backend} unavailable: {message}")]
    Unavailable {
        /// Backend description
        backend: String,
        /// What went wrong
        message: String,
    },

    /// The key is empty or has an empty, `.` or `..` segment
    #[error("Invalid store key '{0}'")]
    InvalidKey(String),

    /// File I/O error
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded
    #[error("Failed to (de)serialize stored document: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Invalid store configuration: {0}")]
    Configuration(String),

    /// The backend is not compiled in
    #[error("Unsupported store backend: {0}")]
    UnsupportedBackend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<expectations_core::ExpectationError> for StoreError {
    fn from(err: expectations_core::ExpectationError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl StoreError {
    pub(crate) fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
