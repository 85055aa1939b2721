//! Suite bootstrapping from a sample dataset.
//!
//! Profiling proposes a starting suite that the sample already satisfies.
//! The suggestions are deliberately plain; the suite is meant to be reviewed
//! and edited before it guards anything.

use crate::Dataset;
use expectations_core::{AssertionCatalog, AssertionConfig, DataValue, ExpectationSuite, Result};
use tracing::debug;

/// Columns with at most this many distinct values get a `values_in_set`
/// suggestion.
pub const MAX_SET_CARDINALITY: usize = 10;

/// Proposes a suite describing the dataset.
///
/// Per column, in column order:
/// - `not_null` when the dataset has rows and none of them is null
/// - `values_between` over the observed range when every value is numeric
/// - `values_in_set` when values repeat and there are at most
///   [`MAX_SET_CARDINALITY`] of them
///
/// Every suggestion is added through the catalog, so the resulting suite
/// validates against it.
pub fn suggest_suite<C>(
    name: impl Into<String>,
    dataset: &Dataset,
    catalog: &C,
) -> Result<ExpectationSuite>
where
    C: AssertionCatalog + ?Sized,
{
    let mut suite =
        ExpectationSuite::new(name).with_meta("profiled_from", dataset.id().to_string());

    for column in dataset.column_names() {
        for config in suggest_column(dataset, column)? {
            debug!("Suggesting {}", config);
            suite.add(config, catalog)?;
        }
    }

    Ok(suite)
}

fn suggest_column(dataset: &Dataset, column: &str) -> Result<Vec<AssertionConfig>> {
    let mut suggestions = Vec::new();
    let nulls = dataset.null_count(column)?;
    if dataset.row_count() > 0 && nulls == 0 {
        suggestions.push(AssertionConfig::not_null(column));
    }

    let distinct = dataset.distinct_values(column)?;
    if distinct.is_empty() {
        return Ok(suggestions);
    }

    if distinct.iter().all(DataValue::is_numeric) {
        if let Some((min, max)) = dataset.min_max(column)? {
            suggestions.push(AssertionConfig::values_between(
                column,
                Some(min.to_json()),
                Some(max.to_json()),
            ));
        }
    }

    let non_null = dataset.row_count() - nulls;
    if distinct.len() <= MAX_SET_CARDINALITY && distinct.len() < non_null {
        suggestions.push(AssertionConfig::values_in_set(
            column,
            distinct.iter().map(DataValue::to_json),
        ));
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataRow, ExpectationRegistry, Validator};
    use expectations_core::RunContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn trips() -> Dataset {
        let rows = (0..12)
            .map(|i| {
                DataRow::from([
                    ("vendor_id".to_string(), DataValue::Int(i % 2 + 1)),
                    ("fare".to_string(), DataValue::Float(2.5 + i as f64)),
                    (
                        "tip".to_string(),
                        if i % 3 == 0 {
                            DataValue::Null
                        } else {
                            DataValue::Float(1.0)
                        },
                    ),
                ])
            })
            .collect();
        Dataset::new(
            "trips-sample",
            vec!["vendor_id".to_string(), "fare".to_string(), "tip".to_string()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_suggestions_per_column() {
        let registry = ExpectationRegistry::with_builtins();
        let suite = suggest_suite("taxi", &trips(), &registry).unwrap();

        assert_eq!(
            suite.list().to_vec(),
            vec![
                AssertionConfig::not_null("vendor_id"),
                AssertionConfig::values_between("vendor_id", Some(json!(1)), Some(json!(2))),
                AssertionConfig::values_in_set("vendor_id", [json!(1), json!(2)]),
                AssertionConfig::not_null("fare"),
                AssertionConfig::values_between("fare", Some(json!(2.5)), Some(json!(13.5))),
                AssertionConfig::values_between("tip", Some(json!(1.0)), Some(json!(1.0))),
                AssertionConfig::values_in_set("tip", [json!(1.0)]),
            ]
        );
        assert_eq!(suite.meta.get("profiled_from"), Some(&json!("trips-sample")));
    }

    #[test]
    fn test_profiled_suite_passes_on_its_sample() {
        let validator = Validator::with_builtins();
        let dataset = trips();
        let suite = suggest_suite("taxi", &dataset, validator.registry().as_ref()).unwrap();
        let result = validator.run(&dataset, &suite, &RunContext::new()).unwrap();
        assert!(result.success);
    }

    #[test]
    fn test_empty_dataset_yields_empty_suite() {
        let registry = ExpectationRegistry::with_builtins();
        let dataset = Dataset::empty("nothing", vec!["vendor_id".to_string()]);
        let suite = suggest_suite("taxi", &dataset, &registry).unwrap();
        assert!(suite.is_empty());
    }
}
