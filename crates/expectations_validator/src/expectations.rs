//! Built-in assertion types.
//!
//! Column-map assertions (everything except the column aggregates) inspect
//! each value independently and accept a `mostly` tolerance. Nulls are
//! skipped by every column-map assertion except `not_null`.

use crate::{Dataset, Evaluator, Observation};
use chrono::format::{Item, ParseErrorKind, ParseResult, Parsed, StrftimeItems};
use expectations_core::{AssertionConfig, DataValue, ExpectationError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

const MOSTLY: &str = "mostly";
const VALUE_SET: &str = "value_set";
const MIN_VALUE: &str = "min_value";
const MAX_VALUE: &str = "max_value";
const REGEX: &str = "regex";
const FORMAT: &str = "format";

/// `not_null`: every value is present.
pub struct NotNull;

impl Evaluator for NotNull {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[MOSTLY])?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let nulls: Vec<DataValue> = dataset
            .column(&config.column)?
            .filter(|v| v.is_null())
            .cloned()
            .collect();
        let element_count = dataset.row_count();
        let missing_count = nulls.len();
        map_observation(config, element_count, missing_count, element_count, nulls)
    }
}

/// `values_in_set` and `values_not_in_set`.
pub struct ValuesInSet {
    members: bool,
}

impl ValuesInSet {
    /// Non-null values must belong to the set.
    pub fn members() -> Self {
        Self { members: true }
    }

    /// Non-null values must stay outside the set.
    pub fn non_members() -> Self {
        Self { members: false }
    }

    fn value_set(config: &AssertionConfig) -> Result<HashSet<String>> {
        let values = config
            .array_param(VALUE_SET)?
            .ok_or_else(|| config.invalid(format!("'{}' is required", VALUE_SET)))?;
        if values.is_empty() {
            return Err(config.invalid(format!("'{}' must not be empty", VALUE_SET)));
        }
        values
            .iter()
            .map(|v| match DataValue::from_json(v) {
                Some(value) if !value.is_null() => Ok(value.canonical_key()),
                _ => Err(config.invalid(format!(
                    "'{}' must only hold non-null scalars, found {}",
                    VALUE_SET, v
                ))),
            })
            .collect()
    }
}

impl Evaluator for ValuesInSet {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[VALUE_SET, MOSTLY])?;
        Self::value_set(config)?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let set = Self::value_set(config)?;
        collect_map(dataset, config, |value| {
            set.contains(&value.canonical_key()) != self.members
        })
    }
}

/// `values_between`: non-null values fall within inclusive bounds.
pub struct ValuesBetween;

impl Evaluator for ValuesBetween {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[MIN_VALUE, MAX_VALUE, MOSTLY])?;
        Bounds::from_config(config)?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let bounds = Bounds::from_config(config)?;
        collect_map(dataset, config, |value| !bounds.contains(value))
    }
}

/// `matches_format`: non-null values are strings matching a regex.
pub struct MatchesFormat;

impl MatchesFormat {
    fn pattern(config: &AssertionConfig) -> Result<Regex> {
        let source = config.require_str(REGEX)?;
        Regex::new(source).map_err(|e| config.invalid(format!("invalid regex: {}", e)))
    }
}

impl Evaluator for MatchesFormat {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[REGEX, MOSTLY])?;
        Self::pattern(config)?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let pattern = Self::pattern(config)?;
        let unexpected: Vec<DataValue> = dataset
            .values_not_matching(&config.column, &pattern)?
            .into_iter()
            .cloned()
            .collect();
        let missing_count = dataset.null_count(&config.column)?;
        let element_count = dataset.row_count();
        map_observation(
            config,
            element_count,
            missing_count,
            element_count - missing_count,
            unexpected,
        )
    }
}

/// `matches_strftime`: non-null values are strings parseable with a
/// strftime format.
pub struct MatchesStrftime;

impl MatchesStrftime {
    fn format(config: &AssertionConfig) -> Result<&str> {
        let format = config.require_str(FORMAT)?;
        if format.is_empty() {
            return Err(config.invalid(format!("'{}' must not be empty", FORMAT)));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(config.invalid(format!("invalid strftime format '{}'", format)));
        }
        Ok(format)
    }

    /// The value must match the format, and whatever date or time it
    /// describes must exist (no February 30th).
    fn parses(value: &str, fmt: &str) -> bool {
        let mut parsed = Parsed::new();
        if chrono::format::parse(&mut parsed, value, StrftimeItems::new(fmt)).is_err() {
            return false;
        }
        valid_or_absent(parsed.to_naive_date()) && valid_or_absent(parsed.to_naive_time())
    }
}

impl Evaluator for MatchesStrftime {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[FORMAT, MOSTLY])?;
        Self::format(config)?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let format = Self::format(config)?;
        collect_map(dataset, config, |value| match value.as_string() {
            Some(s) => !Self::parses(s, format),
            None => true,
        })
    }
}

/// `unique`: no non-null value occurs more than once.
pub struct Unique;

impl Evaluator for Unique {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[MOSTLY])?;
        mostly(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for value in dataset.column(&config.column)?.filter(|v| !v.is_null()) {
            *occurrences.entry(value.canonical_key()).or_default() += 1;
        }
        collect_map(dataset, config, |value| {
            occurrences
                .get(&value.canonical_key())
                .is_some_and(|count| *count > 1)
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

/// `column_min_between` and `column_max_between`: the column aggregate
/// falls within inclusive bounds.
pub struct ColumnExtremum {
    extremum: Extremum,
}

impl ColumnExtremum {
    /// Checks the column minimum.
    pub fn min() -> Self {
        Self {
            extremum: Extremum::Min,
        }
    }

    /// Checks the column maximum.
    pub fn max() -> Self {
        Self {
            extremum: Extremum::Max,
        }
    }
}

impl Evaluator for ColumnExtremum {
    fn validate_config(&self, config: &AssertionConfig) -> Result<()> {
        config.reject_unknown_params(&[MIN_VALUE, MAX_VALUE])?;
        Bounds::from_config(config)?;
        Ok(())
    }

    fn evaluate(&self, dataset: &Dataset, config: &AssertionConfig) -> Result<Observation> {
        let bounds = Bounds::from_config(config)?;
        let missing_count = dataset.null_count(&config.column)?;
        let observed = dataset
            .min_max(&config.column)?
            .map(|(min, max)| match self.extremum {
                Extremum::Min => min,
                Extremum::Max => max,
            });

        let success = match &observed {
            // No non-null values: there is nothing to bound.
            None => false,
            Some(value) => {
                if !bounds.comparable_with(value) {
                    return Err(ExpectationError::evaluation(
                        &config.expectation_type,
                        format!(
                            "observed {} {} is not comparable with the configured bounds",
                            value.type_name(),
                            value
                        ),
                    ));
                }
                bounds.contains(value)
            }
        };

        debug!(
            "{} observed {:?} (success: {})",
            config, observed, success
        );

        Ok(Observation {
            success,
            element_count: dataset.row_count(),
            missing_count,
            unexpected_values: Vec::new(),
            unexpected_percent: None,
            observed_value: observed,
        })
    }
}

fn valid_or_absent<T>(part: ParseResult<T>) -> bool {
    match part {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    }
}

/// Inclusive bounds; at least one side is present.
struct Bounds {
    min: Option<DataValue>,
    max: Option<DataValue>,
}

impl Bounds {
    fn from_config(config: &AssertionConfig) -> Result<Self> {
        let min = bound(config, MIN_VALUE)?;
        let max = bound(config, MAX_VALUE)?;
        match (&min, &max) {
            (None, None) => {
                return Err(config.invalid(format!(
                    "at least one of '{}' or '{}' is required",
                    MIN_VALUE, MAX_VALUE
                )));
            }
            (Some(lo), Some(hi)) => match lo.compare(hi) {
                None => {
                    return Err(config.invalid(format!(
                        "'{}' and '{}' are not comparable",
                        MIN_VALUE, MAX_VALUE
                    )));
                }
                Some(Ordering::Greater) => {
                    return Err(config.invalid(format!(
                        "'{}' ({}) is greater than '{}' ({})",
                        MIN_VALUE, lo, MAX_VALUE, hi
                    )));
                }
                Some(_) => {}
            },
            _ => {}
        }
        Ok(Self { min, max })
    }

    /// Incomparable values are outside the bounds.
    fn contains(&self, value: &DataValue) -> bool {
        let above_min = self
            .min
            .as_ref()
            .is_none_or(|min| matches!(value.compare(min), Some(Ordering::Greater | Ordering::Equal)));
        let below_max = self
            .max
            .as_ref()
            .is_none_or(|max| matches!(value.compare(max), Some(Ordering::Less | Ordering::Equal)));
        above_min && below_max
    }

    fn comparable_with(&self, value: &DataValue) -> bool {
        self.min.iter().chain(self.max.iter()).all(|b| value.compare(b).is_some())
    }
}

fn bound(config: &AssertionConfig, name: &str) -> Result<Option<DataValue>> {
    match config.get(name) {
        None => Ok(None),
        Some(raw) => match DataValue::from_json(raw) {
            Some(value) if !value.is_null() => Ok(Some(value)),
            _ => Err(config.invalid(format!("'{}' must be a scalar, found {}", name, raw))),
        },
    }
}

/// Reads the `mostly` tolerance, checking it lies in `[0, 1]`.
fn mostly(config: &AssertionConfig) -> Result<Option<f64>> {
    match config.f64_param(MOSTLY)? {
        Some(fraction) if !(0.0..=1.0).contains(&fraction) => Err(config.invalid(format!(
            "'{}' must be between 0 and 1, got {}",
            MOSTLY, fraction
        ))),
        fraction => Ok(fraction),
    }
}

/// Evaluates a column-map predicate over the non-null values of a column.
fn collect_map<F>(dataset: &Dataset, config: &AssertionConfig, mut is_unexpected: F) -> Result<Observation>
where
    F: FnMut(&DataValue) -> bool,
{
    let mut missing_count = 0;
    let mut unexpected = Vec::new();
    for value in dataset.column(&config.column)? {
        if value.is_null() {
            missing_count += 1;
        } else if is_unexpected(value) {
            unexpected.push(value.clone());
        }
    }
    let element_count = dataset.row_count();
    map_observation(
        config,
        element_count,
        missing_count,
        element_count - missing_count,
        unexpected,
    )
}

/// Applies the `mostly` rule: the assertion holds when the passing fraction of
/// `applicable` values reaches `mostly`, or when nothing is unexpected if no
/// tolerance is configured.
fn map_observation(
    config: &AssertionConfig,
    element_count: usize,
    missing_count: usize,
    applicable: usize,
    unexpected_values: Vec<DataValue>,
) -> Result<Observation> {
    let unexpected = unexpected_values.len();
    let unexpected_percent = (applicable > 0).then(|| unexpected as f64 / applicable as f64 * 100.0);
    let success = match mostly(config)? {
        None => unexpected == 0,
        Some(_) if applicable == 0 => true,
        Some(fraction) => 1.0 - unexpected as f64 / applicable as f64 >= fraction,
    };
    Ok(Observation {
        success,
        element_count,
        missing_count,
        unexpected_values,
        unexpected_percent,
        observed_value: None,
    })
}
