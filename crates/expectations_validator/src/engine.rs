//! Validation runner.
//!
//! This module provides the `Validator` that evaluates every assertion of a
//! suite against a dataset and assembles the `ValidationResult`.

use crate::{Dataset, ExpectationRegistry, Observation};
use expectations_core::{
    AssertionCatalog, AssertionConfig, ExpectationError, ExpectationSuite, Result, RunContext,
    ValidationOutcome, ValidationResult,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs expectation suites against datasets.
///
/// A `Validator` holds no per-run state, so one instance can serve concurrent
/// runs from several threads.
///
/// # Example
///
/// ```rust
/// use expectations_validator::{DataRow, Dataset, Validator};
/// use expectations_core::{AssertionConfig, ExpectationSuite, RunContext};
///
/// let validator = Validator::with_builtins();
/// let rows = vec![DataRow::from([("vendor_id".to_string(), 1.into())])];
/// let dataset = Dataset::from_rows("trips", rows).unwrap();
///
/// let mut suite = ExpectationSuite::new("trips");
/// suite
///     .add(AssertionConfig::not_null("vendor_id"), validator.registry().as_ref())
///     .unwrap();
///
/// let result = validator.run(&dataset, &suite, &RunContext::new()).unwrap();
/// assert!(result.success);
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<ExpectationRegistry>,
}

impl Validator {
    /// Creates a validator resolving assertion types through the registry.
    pub fn new(registry: Arc<ExpectationRegistry>) -> Self {
        Self { registry }
    }

    /// Creates a validator over a fresh registry of built-in types.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(ExpectationRegistry::with_builtins()))
    }

    /// Returns the registry used for type resolution.
    pub fn registry(&self) -> &Arc<ExpectationRegistry> {
        &self.registry
    }

    /// Checks every config of the suite without evaluating anything.
    ///
    /// # Errors
    ///
    /// The first `UnknownAssertionType`, `InvalidAssertionConfig` or
    /// `SchemaError` (column absent from the dataset), in suite order.
    pub fn preflight(&self, dataset: &Dataset, suite: &ExpectationSuite) -> Result<()> {
        for config in suite.list() {
            self.registry.validate_config(config)?;
            if !dataset.has_column(&config.column) {
                return Err(ExpectationError::missing_column(&config.column));
            }
        }
        Ok(())
    }

    /// Evaluates the suite against the dataset.
    ///
    /// Outcomes follow suite order. In strict mode configuration problems
    /// abort the run; otherwise every failure, including a panicking
    /// evaluator, is confined to the outcome of the assertion that caused it.
    pub fn run(
        &self,
        dataset: &Dataset,
        suite: &ExpectationSuite,
        context: &RunContext,
    ) -> Result<ValidationResult> {
        info!(
            "Running suite '{}' against dataset '{}' ({} rows, {} assertions)",
            suite.name,
            dataset.id(),
            dataset.row_count(),
            suite.len()
        );

        if context.strict {
            self.preflight(dataset, suite)?;
        }

        let timestamp = context.timestamp();
        let outcomes: Vec<ValidationOutcome> = suite
            .list()
            .iter()
            .map(|config| self.evaluate(dataset, config, context))
            .collect();

        let result = ValidationResult::new(
            &suite.name,
            dataset.id(),
            timestamp,
            outcomes,
            context.metadata.clone(),
        );

        info!(
            "Suite '{}' {}: {}/{} assertions succeeded",
            suite.name,
            if result.success { "passed" } else { "failed" },
            result.statistics.successful,
            result.statistics.evaluated
        );

        Ok(result)
    }

    /// Evaluates one config, turning every failure into a failed outcome.
    fn evaluate(
        &self,
        dataset: &Dataset,
        config: &AssertionConfig,
        context: &RunContext,
    ) -> ValidationOutcome {
        let start = Instant::now();
        let observation = self.observe(dataset, config);
        let duration_us = context
            .record_timing
            .then(|| u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX));

        let mut outcome = match observation {
            Ok(observation) => {
                debug!("{} -> success: {}", config, observation.success);
                into_outcome(config.clone(), observation, context.sample_limit)
            }
            Err(err) => {
                warn!("Assertion {} could not be evaluated: {}", config, err);
                ValidationOutcome::errored(config.clone(), &err)
            }
        };
        outcome.duration_us = duration_us;
        outcome
    }

    fn observe(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let evaluator = self.registry.resolve(&config.expectation_type)?;
        let evaluated = panic::catch_unwind(AssertUnwindSafe(|| {
            evaluator.validate_config(config)?;
            evaluator.evaluate(dataset, config)
        }));
        evaluated.unwrap_or_else(|payload| {
            Err(ExpectationError::evaluation(
                &config.expectation_type,
                format!("evaluator panicked: {}", panic_message(payload.as_ref())),
            ))
        })
    }
}

fn into_outcome(
    config: AssertionConfig,
    observation: Observation,
    sample_limit: usize,
) -> ValidationOutcome {
    let unexpected_count = observation.unexpected_values.len();
    let mut unexpected_sample = observation.unexpected_values;
    unexpected_sample.truncate(sample_limit);

    ValidationOutcome {
        config,
        success: observation.success,
        element_count: observation.element_count,
        missing_count: observation.missing_count,
        unexpected_count,
        unexpected_percent: observation.unexpected_percent,
        unexpected_sample,
        observed_value: observation.observed_value,
        error: None,
        duration_us: None,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
