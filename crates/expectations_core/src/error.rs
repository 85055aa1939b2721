//! Error types for the expectations engine.
//!
//! Configuration mistakes (unknown columns, malformed parameters, duplicates)
//! and evaluator faults share one enum so that the runner can fold any of them
//! into a failed outcome without losing the kind of failure.

use thiserror::Error;

/// Result type for expectation operations.
pub type Result<T> = std::result::Result<T, ExpectationError>;

/// Main error type for expectation operations.
#[derive(Error, Debug)]
pub enum ExpectationError {
    /// A requested column is absent, or the dataset shape is inconsistent
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// No evaluator is registered under this type id
    #[error("Unknown assertion type: '{0}'")]
    UnknownAssertionType(String),

    /// Parameters are not well-formed for the assertion type
    #[error("Invalid configuration for '{type_id}' on column '{column}': {message}")]
    InvalidAssertionConfig {
        /// Assertion type id
        type_id: String,
        /// Target column
        column: String,
        /// The violated constraint
        message: String,
    },

    /// An identical assertion (type, column and parameters) is already in the suite
    #[error("Duplicate assertion '{type_id}' on column '{column}' in suite '{suite}'")]
    DuplicateAssertion {
        /// Suite name
        suite: String,
        /// Assertion type id
        type_id: String,
        /// Target column
        column: String,
    },

    /// The type id is already registered
    #[error("Assertion type '{0}' is already registered")]
    DuplicateType(String),

    /// An evaluator failed while computing an outcome
    #[error("Evaluation of '{type_id}' failed: {message}")]
    EvaluationError {
        /// Assertion type id
        type_id: String,
        /// Failure details
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExpectationError {
    /// Creates a new schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError(message.into())
    }

    /// Creates a missing-column schema error.
    pub fn missing_column(column: &str) -> Self {
        Self::SchemaError(format!("column '{}' does not exist", column))
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(
        type_id: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAssertionConfig {
            type_id: type_id.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a new evaluation error.
    pub fn evaluation(type_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EvaluationError {
            type_id: type_id.into(),
            message: message.into(),
        }
    }

    /// Stable identifier for the error kind, used in outcome error details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaError(_) => "schema_error",
            Self::UnknownAssertionType(_) => "unknown_assertion_type",
            Self::InvalidAssertionConfig { .. } => "invalid_assertion_config",
            Self::DuplicateAssertion { .. } => "duplicate_assertion",
            Self::DuplicateType(_) => "duplicate_type",
            Self::EvaluationError { .. } => "evaluation_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// Returns true for errors that indicate a configuration mistake rather
    /// than a fault during evaluation.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::EvaluationError { .. })
    }
}
