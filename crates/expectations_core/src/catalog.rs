//! The seam between suites and the assertion type registry.
//!
//! Suites validate every configuration they accept, but the set of known
//! assertion types lives in the validator crate. This trait lets a suite ask
//! "is this configuration well-formed?" without depending on evaluators.

use crate::{AssertionConfig, Result};

/// A catalog of assertion types able to check configurations.
///
/// # Example
///
/// ```rust
/// use expectations_core::{AssertionCatalog, AssertionConfig, ExpectationError, Result};
///
/// struct NotNullOnly;
///
/// impl AssertionCatalog for NotNullOnly {
///     fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
///         if config.expectation_type == "not_null" {
///             Ok(())
///         } else {
///             Err(ExpectationError::UnknownAssertionType(
///                 config.expectation_type.clone(),
///             ))
///         }
///     }
///
///     fn contains(&self, type_id: &str) -> bool {
///         type_id == "not_null"
///     }
/// }
/// ```
pub trait AssertionCatalog: Send + Sync {
    /// Checks that the configuration names a known type and carries
    /// well-formed parameters for it.
    ///
    /// # Errors
    ///
    /// `UnknownAssertionType` if the type is not registered,
    /// `InvalidAssertionConfig` if the parameters are malformed.
    fn validate_config(&self, config: &AssertionConfig) -> Result<()>;

    /// Returns true if the type id is known to the catalog.
    fn contains(&self, type_id: &str) -> bool;
}
