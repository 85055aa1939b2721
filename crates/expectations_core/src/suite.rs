//! Assertion configurations and expectation suites.
//!
//! A suite is a named, ordered collection of assertion configurations. The
//! order is significant: it defines both evaluation order and report order.

use crate::{AssertionCatalog, ExpectationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Type-specific parameters of an assertion, ordered by name.
pub type Parameters = BTreeMap<String, Value>;

/// A single configured assertion.
///
/// Identifies an assertion type, the column it targets and the parameters
/// the type needs. Two configs are duplicates when all three are equal.
///
/// # Example
///
/// ```rust
/// use expectations_core::AssertionConfig;
///
/// let config = AssertionConfig::new("values_in_set", "vendor_id")
///     .param("value_set", serde_json::json!([1, 2]));
///
/// assert_eq!(config.expectation_type, "values_in_set");
/// assert_eq!(config.to_string(), "values_in_set(vendor_id)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionConfig {
    /// Assertion type id (e.g., "not_null", "values_between")
    #[serde(rename = "type")]
    pub expectation_type: String,

    /// Target column name
    pub column: String,

    /// Type-specific parameters
    #[serde(default)]
    pub params: Parameters,
}

impl AssertionConfig {
    /// Creates a config with no parameters.
    pub fn new(expectation_type: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            expectation_type: expectation_type.into(),
            column: column.into(),
            params: Parameters::new(),
        }
    }

    /// Sets a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns the raw parameter value, if present and not null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name).filter(|v| !v.is_null())
    }

    /// Reads an optional numeric parameter.
    pub fn f64_param(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a number", name))),
        }
    }

    /// Reads an optional string parameter.
    pub fn str_param(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a string", name))),
        }
    }

    /// Reads a required string parameter.
    pub fn require_str(&self, name: &str) -> Result<&str> {
        self.str_param(name)?
            .ok_or_else(|| self.invalid(format!("'{}' is required", name)))
    }

    /// Reads an optional array parameter.
    pub fn array_param(&self, name: &str) -> Result<Option<&Vec<Value>>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_array()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a list", name))),
        }
    }

    /// Fails if any parameter is not in the allowed list.
    pub fn reject_unknown_params(&self, allowed: &[&str]) -> Result<()> {
        match self.params.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unknown) => Err(self.invalid(format!("unknown parameter '{}'", unknown))),
            None => Ok(()),
        }
    }

    /// Builds an `InvalidAssertionConfig` error for this config.
    pub fn invalid(&self, message: impl Into<String>) -> ExpectationError {
        ExpectationError::invalid_config(&self.expectation_type, &self.column, message)
    }
}

impl fmt::Display for AssertionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.expectation_type, self.column)
    }
}

/// An ordered, named collection of unique assertion configs.
///
/// A suite is a draft while it is being built through [`add`](Self::add) and
/// [`remove`](Self::remove). Persisting it stores a snapshot; loading yields a
/// fresh draft copy. Deserialization rejects duplicate configs.
///
/// # Example
///
/// ```rust
/// use expectations_core::{AssertionCatalog, AssertionConfig, ExpectationSuite, Result};
///
/// struct AcceptAll;
///
/// impl AssertionCatalog for AcceptAll {
///     fn validate_config(&self, _config: &AssertionConfig) -> Result<()> {
///         Ok(())
///     }
///     fn contains(&self, _type_id: &str) -> bool {
///         true
///     }
/// }
///
/// let mut suite = ExpectationSuite::new("taxi_trips");
/// suite.add(AssertionConfig::new("not_null", "vendor_id"), &AcceptAll).unwrap();
/// assert!(suite.add(AssertionConfig::new("not_null", "vendor_id"), &AcceptAll).is_err());
/// assert_eq!(suite.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSuite")]
pub struct ExpectationSuite {
    /// Unique suite name
    pub name: String,

    /// Ordered assertion configs
    expectations: Vec<AssertionConfig>,

    /// Free-form notes carried with the suite
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

/// Unchecked wire shape of a suite.
#[derive(Deserialize)]
struct RawSuite {
    name: String,
    #[serde(default)]
    expectations: Vec<AssertionConfig>,
    #[serde(default)]
    meta: BTreeMap<String, Value>,
}

impl TryFrom<RawSuite> for ExpectationSuite {
    type Error = ExpectationError;

    fn try_from(raw: RawSuite) -> Result<Self> {
        let mut suite = ExpectationSuite::new(raw.name);
        suite.meta = raw.meta;
        for config in raw.expectations {
            suite.push_unique(config)?;
        }
        Ok(suite)
    }
}

impl ExpectationSuite {
    /// Creates an empty suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectations: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Validates the config against the catalog and appends it.
    ///
    /// # Errors
    ///
    /// Whatever the catalog reports for a malformed or unknown config, or
    /// `DuplicateAssertion` if an identical config is already present.
    pub fn add<C>(&mut self, config: AssertionConfig, catalog: &C) -> Result<()>
    where
        C: AssertionCatalog + ?Sized,
    {
        catalog.validate_config(&config)?;
        self.push_unique(config)
    }

    /// Removes every config matching the predicate and returns how many were removed.
    pub fn remove<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&AssertionConfig) -> bool,
    {
        let before = self.expectations.len();
        self.expectations.retain(|config| !predicate(config));
        before - self.expectations.len()
    }

    /// Returns the configs in insertion order.
    pub fn list(&self) -> &[AssertionConfig] {
        &self.expectations
    }

    /// Returns the number of configs.
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Returns true if the suite holds no configs.
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Returns true if an identical config is present.
    pub fn contains(&self, config: &AssertionConfig) -> bool {
        self.expectations.iter().any(|c| c == config)
    }

    /// Re-checks every config against the catalog, e.g. after loading a document.
    pub fn validate<C>(&self, catalog: &C) -> Result<()>
    where
        C: AssertionCatalog + ?Sized,
    {
        self.expectations
            .iter()
            .try_for_each(|config| catalog.validate_config(config))
    }

    /// Appends configs of a previous snapshot that this suite no longer holds
    /// and that `keep` selects. Returns the number of configs retained.
    ///
    /// Retained configs keep their relative order from `previous` and land
    /// after the configs already in this suite.
    pub fn retain_from<F>(&mut self, previous: &ExpectationSuite, mut keep: F) -> usize
    where
        F: FnMut(&AssertionConfig) -> bool,
    {
        let mut retained = 0;
        for config in previous.list() {
            if !self.contains(config) && keep(config) {
                self.expectations.push(config.clone());
                retained += 1;
            }
        }
        retained
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Serializes the suite to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a suite from JSON, rejecting duplicate configs.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn push_unique(&mut self, config: AssertionConfig) -> Result<()> {
        if self.contains(&config) {
            return Err(ExpectationError::DuplicateAssertion {
                suite: self.name.clone(),
                type_id: config.expectation_type,
                column: config.column,
            });
        }
        self.expectations.push(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct AcceptAll;

    impl AssertionCatalog for AcceptAll {
        fn validate_config(&self, _config: &AssertionConfig) -> Result<()> {
            Ok(())
        }

        fn contains(&self, _type_id: &str) -> bool {
            true
        }
    }

    struct RejectAll;

    impl AssertionCatalog for RejectAll {
        fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
            Err(ExpectationError::UnknownAssertionType(
                config.expectation_type.clone(),
            ))
        }

        fn contains(&self, _type_id: &str) -> bool {
            false
        }
    }

    fn taxi_suite() -> ExpectationSuite {
        let mut suite = ExpectationSuite::new("taxi_trips");
        suite
            .add(AssertionConfig::new("not_null", "vendor_id"), &AcceptAll)
            .unwrap();
        suite
            .add(
                AssertionConfig::new("values_in_set", "vendor_id").param("value_set", json!([1, 2])),
                &AcceptAll,
            )
            .unwrap();
        suite
            .add(
                AssertionConfig::new("values_between", "passenger_count")
                    .param("min_value", 1)
                    .param("max_value", 6),
                &AcceptAll,
            )
            .unwrap();
        suite
    }

    #[test]
    fn test_add_preserves_order() {
        let suite = taxi_suite();
        let types: Vec<_> = suite
            .list()
            .iter()
            .map(|c| c.expectation_type.as_str())
            .collect();
        assert_eq!(types, vec!["not_null", "values_in_set", "values_between"]);
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut suite = taxi_suite();
        let err = suite
            .add(
                AssertionConfig::new("values_in_set", "vendor_id").param("value_set", json!([1, 2])),
                &AcceptAll,
            )
            .unwrap_err();
        assert!(matches!(err, ExpectationError::DuplicateAssertion { .. }));
        assert_eq!(suite.len(), 3);
    }

    #[test]
    fn test_add_allows_same_type_with_different_params() {
        let mut suite = taxi_suite();
        suite
            .add(
                AssertionConfig::new("values_in_set", "vendor_id")
                    .param("value_set", json!([1, 2, 4])),
                &AcceptAll,
            )
            .unwrap();
        assert_eq!(suite.len(), 4);
    }

    #[test]
    fn test_add_propagates_catalog_error() {
        let mut suite = ExpectationSuite::new("s");
        let err = suite
            .add(AssertionConfig::new("bogus", "x"), &RejectAll)
            .unwrap_err();
        assert!(matches!(err, ExpectationError::UnknownAssertionType(_)));
        assert!(suite.is_empty());
    }

    #[test]
    fn test_remove_by_predicate() {
        let mut suite = taxi_suite();
        let removed = suite.remove(|c| c.column == "vendor_id");
        assert_eq!(removed, 2);
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.list()[0].column, "passenger_count");

        assert_eq!(suite.remove(|c| c.column == "missing"), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let suite = taxi_suite().with_meta("notes", "January 2019 trips");
        let json = suite.to_json().unwrap();
        let parsed = ExpectationSuite::from_json(&json).unwrap();
        assert_eq!(parsed, suite);
    }

    #[test]
    fn test_document_shape() {
        let suite = taxi_suite();
        let value = serde_json::to_value(&suite).unwrap();
        assert_eq!(value["name"], "taxi_trips");
        assert_eq!(value["expectations"][1]["type"], "values_in_set");
        assert_eq!(value["expectations"][1]["column"], "vendor_id");
        assert_eq!(value["expectations"][1]["params"]["value_set"], json!([1, 2]));
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"{
            "name": "dupes",
            "expectations": [
                {"type": "not_null", "column": "a", "params": {}},
                {"type": "not_null", "column": "a"}
            ]
        }"#;
        assert!(ExpectationSuite::from_json(json).is_err());
    }

    #[test]
    fn test_retain_from() {
        let previous = taxi_suite();
        let mut next = ExpectationSuite::new("taxi_trips");
        next.add(AssertionConfig::new("not_null", "vendor_id"), &AcceptAll)
            .unwrap();

        let retained = next.retain_from(&previous, |c| c.expectation_type == "values_between");
        assert_eq!(retained, 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.list()[1].expectation_type, "values_between");
    }

    #[test]
    fn test_param_accessors() {
        let config = AssertionConfig::new("values_between", "fare")
            .param("min_value", 0)
            .param("max_value", "high")
            .param("mostly", Value::Null);

        assert_eq!(config.f64_param("min_value").unwrap(), Some(0.0));
        assert!(config.f64_param("max_value").is_err());
        assert_eq!(config.f64_param("mostly").unwrap(), None);
        assert!(config.require_str("regex").is_err());
        assert!(config.reject_unknown_params(&["min_value", "max_value", "mostly"]).is_ok());
        assert!(config.reject_unknown_params(&["min_value"]).is_err());
    }
}
