//! Builder pattern for creating expectation suites.
//!
//! This module provides ergonomic constructors for the built-in assertion
//! types and a fluent builder that validates every config it collects.

use crate::{AssertionCatalog, AssertionConfig, ExpectationSuite, Result};
use serde_json::Value;

/// Type ids of the assertion types shipped with the engine.
pub mod builtin {
    /// Column values must not be null.
    pub const NOT_NULL: &str = "not_null";
    /// Column values must belong to `value_set`.
    pub const VALUES_IN_SET: &str = "values_in_set";
    /// Column values must not belong to `value_set`.
    pub const VALUES_NOT_IN_SET: &str = "values_not_in_set";
    /// Column values must lie within `min_value`..=`max_value`.
    pub const VALUES_BETWEEN: &str = "values_between";
    /// Column values must be strings matching `regex`.
    pub const MATCHES_FORMAT: &str = "matches_format";
    /// Column values must be strings parseable with the strftime `format`.
    pub const MATCHES_STRFTIME: &str = "matches_strftime";
    /// Column values must not repeat.
    pub const UNIQUE: &str = "unique";
    /// The column minimum must lie within `min_value`..=`max_value`.
    pub const COLUMN_MIN_BETWEEN: &str = "column_min_between";
    /// The column maximum must lie within `min_value`..=`max_value`.
    pub const COLUMN_MAX_BETWEEN: &str = "column_max_between";
}

impl AssertionConfig {
    /// `not_null` on a column.
    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(builtin::NOT_NULL, column)
    }

    /// `values_in_set` on a column.
    pub fn values_in_set<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(builtin::VALUES_IN_SET, column).param("value_set", collect_values(values))
    }

    /// `values_not_in_set` on a column.
    pub fn values_not_in_set<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(builtin::VALUES_NOT_IN_SET, column).param("value_set", collect_values(values))
    }

    /// `values_between` on a column. Either bound may be omitted.
    pub fn values_between(
        column: impl Into<String>,
        min_value: Option<impl Into<Value>>,
        max_value: Option<impl Into<Value>>,
    ) -> Self {
        with_bounds(Self::new(builtin::VALUES_BETWEEN, column), min_value, max_value)
    }

    /// `matches_format` on a column.
    pub fn matches_format(column: impl Into<String>, regex: impl Into<String>) -> Self {
        Self::new(builtin::MATCHES_FORMAT, column).param("regex", regex.into())
    }

    /// `matches_strftime` on a column.
    pub fn matches_strftime(column: impl Into<String>, format: impl Into<String>) -> Self {
        Self::new(builtin::MATCHES_STRFTIME, column).param("format", format.into())
    }

    /// `unique` on a column.
    pub fn unique(column: impl Into<String>) -> Self {
        Self::new(builtin::UNIQUE, column)
    }

    /// `column_min_between` on a column. Either bound may be omitted.
    pub fn column_min_between(
        column: impl Into<String>,
        min_value: Option<impl Into<Value>>,
        max_value: Option<impl Into<Value>>,
    ) -> Self {
        with_bounds(Self::new(builtin::COLUMN_MIN_BETWEEN, column), min_value, max_value)
    }

    /// `column_max_between` on a column. Either bound may be omitted.
    pub fn column_max_between(
        column: impl Into<String>,
        min_value: Option<impl Into<Value>>,
        max_value: Option<impl Into<Value>>,
    ) -> Self {
        with_bounds(Self::new(builtin::COLUMN_MAX_BETWEEN, column), min_value, max_value)
    }

    /// Sets the `mostly` tolerance (fraction of non-null values that must pass).
    pub fn mostly(self, fraction: f64) -> Self {
        self.param("mostly", fraction)
    }
}

fn collect_values<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Value::Array(values.into_iter().map(Into::into).collect())
}

fn with_bounds(
    mut config: AssertionConfig,
    min_value: Option<impl Into<Value>>,
    max_value: Option<impl Into<Value>>,
) -> AssertionConfig {
    if let Some(min) = min_value {
        config = config.param("min_value", min);
    }
    if let Some(max) = max_value {
        config = config.param("max_value", max);
    }
    config
}

/// Builder for creating an `ExpectationSuite`.
///
/// # Example
///
/// ```rust
/// use expectations_core::{AssertionCatalog, AssertionConfig, Result, SuiteBuilder};
///
/// # struct AcceptAll;
/// # impl AssertionCatalog for AcceptAll {
/// #     fn validate_config(&self, _c: &AssertionConfig) -> Result<()> { Ok(()) }
/// #     fn contains(&self, _t: &str) -> bool { true }
/// # }
/// let suite = SuiteBuilder::new("taxi_trips")
///     .expectation(AssertionConfig::not_null("vendor_id"))
///     .expectation(AssertionConfig::values_in_set("vendor_id", [1, 2]))
///     .meta("notes", "January 2019 yellow cab trips")
///     .build(&AcceptAll)
///     .unwrap();
///
/// assert_eq!(suite.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    name: String,
    expectations: Vec<AssertionConfig>,
    meta: Vec<(String, Value)>,
}

impl SuiteBuilder {
    /// Creates a new suite builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an assertion config.
    pub fn expectation(mut self, config: AssertionConfig) -> Self {
        self.expectations.push(config);
        self
    }

    /// Adds multiple assertion configs.
    pub fn expectations(mut self, configs: impl IntoIterator<Item = AssertionConfig>) -> Self {
        self.expectations.extend(configs);
        self
    }

    /// Adds a metadata entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.push((key.into(), value.into()));
        self
    }

    /// Builds the suite, validating every config through the catalog.
    ///
    /// # Errors
    ///
    /// The first configuration or duplicate error encountered.
    pub fn build<C>(self, catalog: &C) -> Result<ExpectationSuite>
    where
        C: AssertionCatalog + ?Sized,
    {
        let mut suite = ExpectationSuite::new(self.name);
        for (key, value) in self.meta {
            suite.meta.insert(key, value);
        }
        for config in self.expectations {
            suite.add(config, catalog)?;
        }
        Ok(suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpectationError;
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

    #[test]
    fn test_convenience_constructors() {
        let config = AssertionConfig::values_in_set("vendor_id", [1, 2]);
        assert_eq!(config.expectation_type, "values_in_set");
        assert_eq!(config.params["value_set"], json!([1, 2]));

        let config = AssertionConfig::values_between("fare", Some(0.0), None::<f64>);
        assert_eq!(config.params["min_value"], json!(0.0));
        assert!(!config.params.contains_key("max_value"));

        let config = AssertionConfig::not_null("vendor_id").mostly(0.95);
        assert_eq!(config.params["mostly"], json!(0.95));

        let config = AssertionConfig::matches_format("store_and_fwd_flag", "^[YN]$");
        assert_eq!(config.params["regex"], json!("^[YN]$"));
    }

    #[test]
    fn test_suite_builder() {
        let suite = SuiteBuilder::new("taxi")
            .expectation(AssertionConfig::not_null("vendor_id"))
            .expectations(vec![
                AssertionConfig::unique("trip_id"),
                AssertionConfig::matches_strftime("pickup", "%Y-%m-%d %H:%M:%S"),
            ])
            .meta("owner", "data-team")
            .build(&AcceptAll)
            .unwrap();

        assert_eq!(suite.name, "taxi");
        assert_eq!(suite.len(), 3);
        assert_eq!(suite.list()[1].expectation_type, "unique");
        assert_eq!(suite.meta["owner"], json!("data-team"));
    }

    #[test]
    fn test_suite_builder_rejects_duplicates() {
        let err = SuiteBuilder::new("taxi")
            .expectation(AssertionConfig::not_null("vendor_id"))
            .expectation(AssertionConfig::not_null("vendor_id"))
            .build(&AcceptAll)
            .unwrap_err();
        assert!(matches!(err, ExpectationError::DuplicateAssertion { .. }));
    }
}
