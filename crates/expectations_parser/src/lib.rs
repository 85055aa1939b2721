//! Parser for expectation suite documents (YAML/TOML/JSON formats).
//!
//! This module reads and writes `ExpectationSuite` documents. The format is
//! picked from the file extension.
//!
//! # Example
//!
//! ```rust
//! use expectations_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: yellow_trips
//! expectations:
//!   - type: not_null
//!     column: vendor_id
//!   - type: values_in_set
//!     column: vendor_id
//!     params:
//!       value_set: [1, 2]
//! "#;
//!
//! let suite = parse_yaml(yaml).expect("Failed to parse suite");
//! assert_eq!(suite.name, "yellow_trips");
//! assert_eq!(suite.len(), 2);
//! ```

use expectations_core::ExpectationSuite;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing suite documents.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or serialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or serialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or serialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported suite file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl SuiteFormat {
    /// Canonical file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            SuiteFormat::Yaml => "yml",
            SuiteFormat::Toml => "toml",
            SuiteFormat::Json => "json",
        }
    }
}

/// Parse a suite from a YAML string.
pub fn parse_yaml(content: &str) -> Result<ExpectationSuite> {
    let suite: ExpectationSuite = serde_yaml_ng::from_str(content)?;
    Ok(suite)
}

/// Parse a suite from a TOML string.
///
/// # Example
///
/// ```rust
/// use expectations_parser::parse_toml;
///
/// let toml = r#"
/// name = "yellow_trips"
///
/// [[expectations]]
/// type = "values_between"
/// column = "fare_amount"
///
/// [expectations.params]
/// min_value = 0
/// max_value = 500
/// "#;
///
/// let suite = parse_toml(toml).unwrap();
/// assert_eq!(suite.list()[0].column, "fare_amount");
/// ```
pub fn parse_toml(content: &str) -> Result<ExpectationSuite> {
    let suite: ExpectationSuite =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(suite)
}

/// Parse a suite from a JSON string.
pub fn parse_json(content: &str) -> Result<ExpectationSuite> {
    let suite: ExpectationSuite = serde_json::from_str(content)?;
    Ok(suite)
}

/// Parse a suite from a string in the given format.
pub fn parse_str(content: &str, format: SuiteFormat) -> Result<ExpectationSuite> {
    match format {
        SuiteFormat::Yaml => parse_yaml(content),
        SuiteFormat::Toml => parse_toml(content),
        SuiteFormat::Json => parse_json(content),
    }
}

/// Detect the suite format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `SuiteFormat::Yaml`
/// * `.toml` → `SuiteFormat::Toml`
/// * `.json` → `SuiteFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<SuiteFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(SuiteFormat::Yaml),
        "toml" => Ok(SuiteFormat::Toml),
        "json" => Ok(SuiteFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a suite from a file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use expectations_parser::parse_file;
/// use std::path::Path;
///
/// let suite = parse_file(Path::new("expectations/yellow_trips.yml")).unwrap();
/// println!("Loaded suite: {}", suite.name);
/// ```
pub fn parse_file(path: &Path) -> Result<ExpectationSuite> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format)
}

/// Serialize a suite in the given format.
///
/// TOML has no null, so suites carrying null parameters only serialize to
/// YAML or JSON.
pub fn to_string(suite: &ExpectationSuite, format: SuiteFormat) -> Result<String> {
    match format {
        SuiteFormat::Yaml => Ok(serde_yaml_ng::to_string(suite)?),
        SuiteFormat::Toml => {
            toml::to_string_pretty(suite).map_err(|e| ParserError::TomlError(e.to_string()))
        }
        SuiteFormat::Json => Ok(serde_json::to_string_pretty(suite)?),
    }
}

/// Write a suite to a file, picking the format from its extension.
pub fn write_file(path: &Path, suite: &ExpectationSuite) -> Result<()> {
    let content = to_string(suite, detect_format(path)?)?;
    std::fs::write(path, content)?;
    Ok(())
}
