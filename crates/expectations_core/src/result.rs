//! Validation outcomes and results.
//!
//! Results are plain values: produced once by a run, then persisted or
//! rendered by external collaborators.

use crate::{AssertionConfig, DataValue, ExpectationError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error detail attached to an outcome whose evaluation did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Error kind (e.g., "evaluation_error", "schema_error")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ExpectationError> for OutcomeError {
    fn from(err: &ExpectationError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// The outcome of evaluating one assertion config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// The evaluated config (`type`, `column`, `params`)
    #[serde(flatten)]
    pub config: AssertionConfig,

    /// Whether the assertion held
    pub success: bool,

    /// Number of rows inspected
    pub element_count: usize,

    /// Number of null values in the column
    pub missing_count: usize,

    /// True total of values violating the assertion
    pub unexpected_count: usize,

    /// Unexpected values as a percentage of non-null values
    pub unexpected_percent: Option<f64>,

    /// First unexpected values in row order, capped by the run's sample limit
    pub unexpected_sample: Vec<DataValue>,

    /// Aggregate value observed by column-level assertions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<DataValue>,

    /// Present when evaluation did not complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,

    /// Evaluation time in microseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl ValidationOutcome {
    /// Creates a failed outcome for an assertion that could not be evaluated.
    pub fn errored(config: AssertionConfig, err: &ExpectationError) -> Self {
        Self {
            config,
            success: false,
            element_count: 0,
            missing_count: 0,
            unexpected_count: 0,
            unexpected_percent: None,
            unexpected_sample: Vec::new(),
            observed_value: None,
            error: Some(OutcomeError::from(err)),
            duration_us: None,
        }
    }

    /// Returns true if the sample holds fewer values than were found.
    pub fn is_sample_truncated(&self) -> bool {
        self.unexpected_sample.len() < self.unexpected_count
    }
}

/// Summary counts of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    /// Number of outcomes
    pub evaluated: usize,
    /// Number of successful outcomes
    pub successful: usize,
    /// Number of failed outcomes
    pub unsuccessful: usize,
    /// Percentage of successful outcomes; absent for an empty suite
    pub success_percent: Option<f64>,
}

impl ValidationStatistics {
    fn from_outcomes(outcomes: &[ValidationOutcome]) -> Self {
        let evaluated = outcomes.len();
        let successful = outcomes.iter().filter(|o| o.success).count();
        Self {
            evaluated,
            successful,
            unsuccessful: evaluated - successful,
            success_percent: (evaluated > 0)
                .then(|| successful as f64 * 100.0 / evaluated as f64),
        }
    }
}

/// The result of running a suite against a dataset.
///
/// `success` is true iff every outcome succeeded, which makes an empty suite
/// vacuously successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Name of the evaluated suite
    pub suite_name: String,

    /// Identity of the dataset snapshot
    pub dataset_id: String,

    /// Overall success
    pub success: bool,

    /// When the run happened
    pub timestamp: DateTime<Utc>,

    /// Summary counts
    pub statistics: ValidationStatistics,

    /// Per-assertion outcomes, in suite order
    pub outcomes: Vec<ValidationOutcome>,

    /// Metadata copied from the run context
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ValidationResult {
    /// Assembles a result, deriving `success` and `statistics` from the outcomes.
    pub fn new(
        suite_name: impl Into<String>,
        dataset_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        outcomes: Vec<ValidationOutcome>,
        meta: BTreeMap<String, String>,
    ) -> Self {
        Self {
            suite_name: suite_name.into(),
            dataset_id: dataset_id.into(),
            success: outcomes.iter().all(|o| o.success),
            timestamp,
            statistics: ValidationStatistics::from_outcomes(&outcomes),
            outcomes,
            meta,
        }
    }

    /// Returns the failed outcomes in suite order.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Returns the outcome recorded for exactly this config.
    pub fn outcome_for(&self, config: &AssertionConfig) -> Option<&ValidationOutcome> {
        self.outcomes.iter().find(|o| &o.config == config)
    }

    /// Serializes the result to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a result from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn outcome(column: &str, success: bool) -> ValidationOutcome {
        ValidationOutcome {
            config: AssertionConfig::new("not_null", column),
            success,
            element_count: 4,
            missing_count: if success { 0 } else { 1 },
            unexpected_count: if success { 0 } else { 1 },
            unexpected_percent: Some(if success { 0.0 } else { 25.0 }),
            unexpected_sample: if success {
                vec![]
            } else {
                vec![DataValue::Null]
            },
            observed_value: None,
            error: None,
            duration_us: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 1, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_success_requires_every_outcome() {
        let result = ValidationResult::new(
            "s",
            "d",
            at(),
            vec![outcome("a", true), outcome("b", false)],
            BTreeMap::new(),
        );
        assert!(!result.success);
        assert_eq!(result.statistics.successful, 1);
        assert_eq!(result.statistics.unsuccessful, 1);
        assert_eq!(result.statistics.success_percent, Some(50.0));
        assert_eq!(result.failed_outcomes().count(), 1);
    }

    #[test]
    fn test_empty_result_is_successful() {
        let result = ValidationResult::new("s", "d", at(), vec![], BTreeMap::new());
        assert!(result.success);
        assert!(result.outcomes.is_empty());
        assert_eq!(result.statistics.success_percent, None);
    }

    #[test]
    fn test_document_shape() {
        let result = ValidationResult::new(
            "taxi",
            "trips_2019_01",
            at(),
            vec![outcome("vendor_id", false)],
            BTreeMap::new(),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["suite_name"], "taxi");
        assert_eq!(value["dataset_id"], "trips_2019_01");
        assert_eq!(value["success"], false);
        assert_eq!(value["timestamp"], "2019-01-31T12:00:00Z");
        assert_eq!(value["outcomes"][0]["type"], "not_null");
        assert_eq!(value["outcomes"][0]["column"], "vendor_id");
        assert_eq!(value["outcomes"][0]["unexpected_count"], 1);
        assert_eq!(value["outcomes"][0]["unexpected_sample"][0], serde_json::Value::Null);
        assert!(value["outcomes"][0].get("error").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut errored = ValidationOutcome::errored(
            AssertionConfig::new("values_between", "fare"),
            &ExpectationError::evaluation("values_between", "boom"),
        );
        errored.duration_us = Some(12);

        let result = ValidationResult::new(
            "taxi",
            "trips",
            at(),
            vec![outcome("vendor_id", true), errored],
            BTreeMap::from([("checkpoint".to_string(), "nightly".to_string())]),
        );
        let parsed = ValidationResult::from_json(&result.to_json().unwrap()).unwrap();
        assert_eq!(parsed, result);
        assert_eq!(
            parsed.outcomes[1].error.as_ref().unwrap().kind,
            "evaluation_error"
        );
    }

    #[test]
    fn test_sample_truncation_flag() {
        let mut o = outcome("a", false);
        assert!(!o.is_sample_truncated());
        o.unexpected_count = 500;
        assert!(o.is_sample_truncated());
    }
}
