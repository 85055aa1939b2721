//! Dataset representation for validation.
//!
//! A `Dataset` is an immutable, in-memory table: an ordered sequence of rows
//! over a fixed column set. Every accessor is read-only, so a dataset can be
//! shared across concurrent validation runs.

use expectations_core::{DataValue, ExpectationError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A single row of data.
pub type DataRow = HashMap<String, DataValue>;

static NULL: DataValue = DataValue::Null;

/// A dataset containing multiple rows.
///
/// # Example
///
/// ```rust
/// use expectations_validator::{DataRow, Dataset};
/// use expectations_core::DataValue;
///
/// let rows: Vec<DataRow> = [1, 1, 2, 3]
///     .into_iter()
///     .map(|v| DataRow::from([("vendor_id".to_string(), DataValue::from(v))]))
///     .collect();
///
/// let dataset = Dataset::new("trips", vec!["vendor_id".to_string()], rows).unwrap();
/// assert_eq!(dataset.row_count(), 4);
/// assert_eq!(dataset.distinct_values("vendor_id").unwrap().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    id: String,
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl Dataset {
    /// Creates a dataset over a fixed column schema.
    ///
    /// # Errors
    ///
    /// `SchemaError` if column names repeat or any row's column set differs
    /// from the declared one.
    pub fn new(id: impl Into<String>, columns: Vec<String>, rows: Vec<DataRow>) -> Result<Self> {
        let declared: HashSet<&str> = columns.iter().map(String::as_str).collect();
        if declared.len() != columns.len() {
            return Err(ExpectationError::schema("column names must be unique"));
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != declared.len() || !row.keys().all(|k| declared.contains(k.as_str())) {
                let mut found: Vec<&str> = row.keys().map(String::as_str).collect();
                found.sort_unstable();
                return Err(ExpectationError::schema(format!(
                    "row {} has columns [{}], expected [{}]",
                    row_idx,
                    found.join(", "),
                    columns.join(", ")
                )));
            }
        }

        Ok(Self {
            id: id.into(),
            columns,
            rows,
        })
    }

    /// Creates a dataset whose columns are taken from the first row, sorted by name.
    pub fn from_rows(id: impl Into<String>, rows: Vec<DataRow>) -> Result<Self> {
        let mut columns: Vec<String> = rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        columns.sort();
        Self::new(id, columns, rows)
    }

    /// Creates a dataset with columns but no rows.
    pub fn empty(id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            id: id.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the dataset identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Returns the values of a column in row order, nulls included.
    ///
    /// # Errors
    ///
    /// `SchemaError` if the column does not exist.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &DataValue> + '_> {
        if !self.has_column(name) {
            return Err(ExpectationError::missing_column(name));
        }
        let name = name.to_string();
        Ok(self
            .rows
            .iter()
            .map(move |row| row.get(&name).unwrap_or(&NULL)))
    }

    /// Counts the null values of a column.
    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.filter(|v| v.is_null()).count())
    }

    /// Returns the distinct non-null values of a column in first-seen order.
    pub fn distinct_values(&self, name: &str) -> Result<Vec<DataValue>> {
        let mut seen = HashSet::new();
        Ok(self
            .column(name)?
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(v.canonical_key()))
            .cloned()
            .collect())
    }

    /// Returns the minimum and maximum non-null values of a column.
    ///
    /// Returns `None` when the column holds no non-null values.
    ///
    /// # Errors
    ///
    /// `SchemaError` if the column does not exist or mixes values that cannot
    /// be ordered against each other.
    pub fn min_max(&self, name: &str) -> Result<Option<(DataValue, DataValue)>> {
        let mut bounds: Option<(&DataValue, &DataValue)> = None;

        for value in self.column(name)?.filter(|v| !v.is_null()) {
            bounds = match bounds {
                None => Some((value, value)),
                Some((min, max)) => {
                    let below = value.compare(min).ok_or_else(|| not_comparable(name, value, min))?;
                    let above = value.compare(max).ok_or_else(|| not_comparable(name, value, max))?;
                    Some((
                        if below == Ordering::Less { value } else { min },
                        if above == Ordering::Greater { value } else { max },
                    ))
                }
            };
        }

        Ok(bounds.map(|(min, max)| (min.clone(), max.clone())))
    }

    /// Returns the non-null values of a column that are not strings matching the pattern.
    pub fn values_not_matching(&self, name: &str, pattern: &Regex) -> Result<Vec<&DataValue>> {
        Ok(self
            .column(name)?
            .filter(|v| !v.is_null())
            .filter(|v| !v.as_string().is_some_and(|s| pattern.is_match(s)))
            .collect())
    }
}

fn not_comparable(column: &str, a: &DataValue, b: &DataValue) -> ExpectationError {
    ExpectationError::schema(format!(
        "column '{}' mixes values that cannot be ordered ({} vs {})",
        column,
        a.type_name(),
        b.type_name()
    ))
}
