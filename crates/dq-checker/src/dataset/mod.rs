//! In-memory tabular datasets.
//!
//! A [`Dataset`] is an ordered sequence of [`Row`]s, each a mapping from column
//! name to [`Value`]. Datasets are materialized by the caller, either row by
//! row or from a polars `DataFrame` via [`Dataset::from_dataframe`]; the
//! checker only reads them.

mod frame;
mod value;

pub use value::{MISSING_MARKERS, Value, ValueKey};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

static NULL_VALUE: Value = Value::Null;

/// One record: column name to value. Absent columns read as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Value of `column`, or `Null` when the row does not carry it.
    pub fn get(&self, column: &str) -> &Value {
        self.0.get(column).unwrap_or(&NULL_VALUE)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

/// A named, ordered sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at (`row`, `column`); `Null` for absent columns.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn value(&self, row: usize, column: &str) -> &Value {
        self.rows[row].get(column)
    }

    /// Every column name carried by at least one row.
    pub fn column_names(&self) -> BTreeSet<&str> {
        self.rows.iter().flat_map(Row::columns).collect()
    }
}

/// Reference datasets available to foreign-key checks, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct References<'a> {
    datasets: HashMap<&'a str, &'a Dataset>,
}

impl<'a> References<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration under the dataset's own name.
    pub fn with(mut self, dataset: &'a Dataset) -> Self {
        self.insert(dataset);
        self
    }

    pub fn insert(&mut self, dataset: &'a Dataset) {
        self.datasets.insert(dataset.name(), dataset);
    }

    pub fn get(&self, name: &str) -> Option<&'a Dataset> {
        self.datasets.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_column_reads_null() {
        let row = Row::new().with("ID", 1);
        assert_eq!(row.get("ID"), &Value::Integer(1));
        assert_eq!(row.get("EMAIL"), &Value::Null);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["ID"]);
    }

    #[test]
    fn test_column_names_union() {
        let dataset = Dataset::from_rows(
            "users",
            vec![
                Row::new().with("ID", 1).with("STATE", "WI"),
                Row::new().with("ID", 2).with("LANGUAGE", "en"),
            ],
        );
        let names: Vec<&str> = dataset.column_names().into_iter().collect();
        assert_eq!(names, vec!["ID", "LANGUAGE", "STATE"]);
        assert_eq!(dataset.value(1, "STATE"), &Value::Null);
    }

    #[test]
    fn test_row_from_iter() {
        let row: Row = [("A", Value::Integer(1)), ("B", Value::Null)].into_iter().collect();
        assert_eq!(row.len(), 2);
        assert!(row.get("B").is_missing());
    }

    #[test]
    fn test_references_lookup() {
        let brands = Dataset::new("brands");
        let references = References::new().with(&brands);
        assert!(references.get("brands").is_some());
        assert!(references.get("products").is_none());
        assert_eq!(references.len(), 1);
    }
}
