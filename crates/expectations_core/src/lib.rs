//! # Data Expectations Core
//!
//! Core data structures and types for the Data Expectations Engine.
//!
//! This crate provides the building blocks for declaring data-quality
//! assertions ("expectations"), grouping them into suites, and describing the
//! results of validating a dataset against a suite.
//!
//! ## Key Concepts
//!
//! - **AssertionConfig**: One declarative rule: a type id, a column, parameters
//! - **ExpectationSuite**: A named, ordered collection of unique configs
//! - **ValidationResult**: Per-assertion outcomes plus an overall verdict
//! - **RunContext**: Options passed explicitly to every validation run
//! - **AssertionCatalog**: The seam through which suites validate configs
//!
//! ## Example
//!
//! ```rust
//! use expectations_core::{AssertionConfig, ExpectationSuite};
//!
//! let json = r#"{
//!     "name": "taxi_trips",
//!     "expectations": [
//!         {"type": "not_null", "column": "vendor_id", "params": {}},
//!         {"type": "values_in_set", "column": "vendor_id", "params": {"value_set": [1, 2]}}
//!     ]
//! }"#;
//!
//! let suite = ExpectationSuite::from_json(json).unwrap();
//! assert_eq!(suite.len(), 2);
//! assert_eq!(suite.list()[0], AssertionConfig::not_null("vendor_id"));
//! ```

pub mod builder;
pub mod catalog;
pub mod context;
pub mod error;
pub mod result;
pub mod suite;
pub mod value;

pub use builder::*;
pub use catalog::*;
pub use context::*;
pub use error::*;
pub use result::*;
pub use suite::*;
pub use value::*;
