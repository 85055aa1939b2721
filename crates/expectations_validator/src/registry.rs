//! Registry mapping assertion type ids to evaluators.

use crate::Dataset;
use crate::expectations;
use expectations_core::{
    AssertionCatalog, AssertionConfig, DataValue, ExpectationError, Result, builtin,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// What an evaluator observed for one assertion, before the runner attaches
/// sampling and timing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    /// Whether the assertion held
    pub success: bool,
    /// Number of rows inspected
    pub element_count: usize,
    /// Number of null values inspected
    pub missing_count: usize,
    /// Every unexpected value, in row order
    pub unexpected_values: Vec<DataValue>,
    /// Unexpected values as a percentage of the values the assertion applies to
    pub unexpected_percent: Option<f64>,
    /// Aggregate value for column-level assertions
    pub observed_value: Option<DataValue>,
}

/// An assertion type: parameter validation plus evaluation.
///
/// Implementations must be pure: evaluating the same config against the same
/// dataset always yields the same observation, with unexpected values in row
/// order.
pub trait Evaluator: Send + Sync {
    /// Checks that the config carries well-formed parameters for this type.
    fn validate_config(&self, config: &AssertionConfig) -> Result<()>;

    /// Evaluates the config against the dataset.
    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation>;
}

/// Registry of assertion types.
///
/// Registration goes through an interior lock, so distinct type ids can be
/// registered from several threads. Replacing an existing type while other
/// threads resolve it is reserved for single-threaded startup.
///
/// # Example
///
/// ```rust
/// use expectations_validator::ExpectationRegistry;
/// use expectations_core::{AssertionCatalog, AssertionConfig};
///
/// let registry = ExpectationRegistry::with_builtins();
/// assert!(registry.contains("not_null"));
/// assert!(registry
///     .validate_config(&AssertionConfig::values_between("fare", Some(10), Some(1)))
///     .is_err());
/// ```
#[derive(Default)]
pub struct ExpectationRegistry {
    evaluators: RwLock<HashMap<String, Arc<dyn Evaluator>>>,
}

impl ExpectationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in assertion type.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        let builtins: [(&str, Arc<dyn Evaluator>); 9] = [
            (builtin::NOT_NULL, Arc::new(expectations::NotNull)),
            (builtin::VALUES_IN_SET, Arc::new(expectations::ValuesInSet::members())),
            (builtin::VALUES_NOT_IN_SET, Arc::new(expectations::ValuesInSet::non_members())),
            (builtin::VALUES_BETWEEN, Arc::new(expectations::ValuesBetween)),
            (builtin::MATCHES_FORMAT, Arc::new(expectations::MatchesFormat)),
            (builtin::MATCHES_STRFTIME, Arc::new(expectations::MatchesStrftime)),
            (builtin::UNIQUE, Arc::new(expectations::Unique)),
            (builtin::COLUMN_MIN_BETWEEN, Arc::new(expectations::ColumnExtremum::min())),
            (builtin::COLUMN_MAX_BETWEEN, Arc::new(expectations::ColumnExtremum::max())),
        ];
        {
            let mut evaluators = registry.write();
            for (type_id, evaluator) in builtins {
                evaluators.insert(type_id.to_string(), evaluator);
            }
        }
        registry
    }

    /// Registers a new assertion type.
    ///
    /// # Errors
    ///
    /// `DuplicateType` if the id is already registered; use
    /// [`replace`](Self::replace) to overwrite deliberately.
    pub fn register(&self, type_id: impl Into<String>, evaluator: Arc<dyn Evaluator>) -> Result<()> {
        let type_id = type_id.into();
        let mut evaluators = self.write();
        if evaluators.contains_key(&type_id) {
            return Err(ExpectationError::DuplicateType(type_id));
        }
        debug!("Registered assertion type '{}'", type_id);
        evaluators.insert(type_id, evaluator);
        Ok(())
    }

    /// Registers an assertion type, overwriting any existing registration.
    ///
    /// Returns the evaluator that was replaced, if any.
    pub fn replace(
        &self,
        type_id: impl Into<String>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Option<Arc<dyn Evaluator>> {
        let type_id = type_id.into();
        debug!("Replacing assertion type '{}'", type_id);
        self.write().insert(type_id, evaluator)
    }

    /// Resolves the evaluator for a type id.
    ///
    /// # Errors
    ///
    /// `UnknownAssertionType` if nothing is registered under the id.
    pub fn resolve(&self, type_id: &str) -> Result<Arc<dyn Evaluator>> {
        self.read()
            .get(type_id)
            .cloned()
            .ok_or_else(|| ExpectationError::UnknownAssertionType(type_id.to_string()))
    }

    /// Returns the registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Evaluator>>> {
        self.evaluators.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Evaluator>>> {
        self.evaluators.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AssertionCatalog for ExpectationRegistry {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        if config.column.trim().is_empty() {
            return Err(config.invalid("column name is empty"));
        }
        self.resolve(&config.expectation_type)?.validate_config(config)
    }

    fn contains(&self, type_id: &str) -> bool {
        self.read().contains_key(type_id)
    }
}

impl std::fmt::Debug for ExpectationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectationRegistry")
            .field("types", &self.type_ids())
            .finish()
    }
}
