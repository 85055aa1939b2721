//! # Data Expectations Validator
//!
//! Evaluation engine for expectation suites. This crate provides:
//!
//! - The `Dataset` accessor that assertions read through
//! - The `ExpectationRegistry` mapping assertion type ids to evaluators
//! - Built-in assertion types (nullability, set membership, ranges, formats,
//!   uniqueness, column aggregates)
//! - The `Validator` runner producing `ValidationResult`s
//! - Suite profiling from a sample dataset
//!
//! ## Example
//!
//! ```rust
//! use expectations_validator::{DataRow, Dataset, Validator};
//! use expectations_core::{AssertionConfig, DataValue, RunContext, SuiteBuilder};
//!
//! let validator = Validator::with_builtins();
//!
//! let rows: Vec<DataRow> = [1, 1, 2, 3]
//!     .into_iter()
//!     .map(|id| DataRow::from([("vendor_id".to_string(), DataValue::Int(id))]))
//!     .collect();
//! let dataset = Dataset::from_rows("trips-2024-01", rows).unwrap();
//!
//! let suite = SuiteBuilder::new("taxi")
//!     .expectation(AssertionConfig::values_in_set("vendor_id", [1, 2]))
//!     .build(validator.registry().as_ref())
//!     .unwrap();
//!
//! let result = validator.run(&dataset, &suite, &RunContext::new()).unwrap();
//! assert!(!result.success);
//! assert_eq!(result.outcomes[0].unexpected_sample, vec![DataValue::Int(3)]);
//! ```

mod dataset;
mod engine;
pub mod expectations;
pub mod profile;
mod registry;

pub use dataset::*;
pub use engine::*;
pub use registry::*;
