//! Loads JSON record files into datasets.
//!
//! A records file is a JSON array of flat objects. Columns are the union of
//! all object keys in first-seen order; a key missing from a record reads as
//! null.

use anyhow::{Context, Result, anyhow, bail};
use expectations_core::DataValue;
use expectations_validator::{DataRow, Dataset};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Reads a records file. The dataset id is the file stem.
pub fn load_records(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("records");

    parse_records(id, &content)
        .with_context(|| format!("Failed to load records from: {}", path.display()))
}

/// Builds a dataset from the JSON text of a records file.
pub fn parse_records(id: &str, content: &str) -> Result<Dataset> {
    let document: Value = serde_json::from_str(content).context("Invalid JSON")?;
    let records = document
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array of objects"))?;

    let mut columns: Vec<String> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| anyhow!("record {} is not an object", idx))?;
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| anyhow!("record {} is not an object", idx))?;
        let mut row = DataRow::with_capacity(columns.len());
        for column in &columns {
            let value = match object.get(column) {
                None => DataValue::Null,
                Some(raw) => match DataValue::from_json(raw) {
                    Some(value) => value,
                    None => bail!("record {} field '{}' is not a scalar", idx, column),
                },
            };
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }

    Ok(Dataset::new(id, columns, rows)?)
}
