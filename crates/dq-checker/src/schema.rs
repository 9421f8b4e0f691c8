//! Schema and foreign-key configuration.
//!
//! A [`Schema`] declares the expected columns of one dataset, in order, along
//! with their type, nullability and key membership. It is plain configuration:
//! callers build it in code or deserialize it from JSON.
//!
//! ```rust,ignore
//! use dq_checker::{ColumnSpec, ExpectedType, Schema};
//!
//! let schema = Schema::new(vec![
//!     ColumnSpec::new("RECEIPT_ID", ExpectedType::String).key(),
//!     ColumnSpec::new("PURCHASE_DATE", ExpectedType::Date).not_in_future(),
//!     ColumnSpec::new("SCAN_DATE", ExpectedType::Date).not_in_future(),
//!     ColumnSpec::new("BARCODE", ExpectedType::Integer).nullable(true),
//! ])
//! .date_order("PURCHASE_DATE", "SCAN_DATE");
//! ```

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Declared type a column's values are expected to coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedType {
    #[default]
    String,
    Integer,
    Float,
    Date,
}

impl ExpectedType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ExpectedType::Integer | ExpectedType::Float)
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpectedType::String => "string",
            ExpectedType::Integer => "integer",
            ExpectedType::Float => "float",
            ExpectedType::Date => "date",
        };
        write!(f, "{}", name)
    }
}

fn default_true() -> bool {
    true
}

/// Metadata for one declared column.
///
/// Deserializing applies the same rule as [`ColumnSpec::key`]: a key column
/// is never nullable, whatever `nullable` says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ColumnSpecDef")]
pub struct ColumnSpec {
    pub name: String,
    pub expected_type: ExpectedType,
    /// Whether missing values are acceptable. Default: true
    pub nullable: bool,
    /// Part of the key expected to identify a row uniquely.
    pub is_key: bool,
    /// Closed set of accepted values, compared against the trimmed text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Flag date values later than the report timestamp.
    pub not_in_future: bool,
}

/// Wire form of [`ColumnSpec`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnSpecDef {
    name: String,
    #[serde(default)]
    expected_type: ExpectedType,
    #[serde(default = "default_true")]
    nullable: bool,
    #[serde(default)]
    is_key: bool,
    #[serde(default)]
    allowed_values: Option<Vec<String>>,
    #[serde(default)]
    not_in_future: bool,
}

impl From<ColumnSpecDef> for ColumnSpec {
    fn from(def: ColumnSpecDef) -> Self {
        Self {
            name: def.name,
            expected_type: def.expected_type,
            nullable: def.nullable && !def.is_key,
            is_key: def.is_key,
            allowed_values: def.allowed_values,
            not_in_future: def.not_in_future,
        }
    }
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, expected_type: ExpectedType) -> Self {
        Self {
            name: name.into(),
            expected_type,
            nullable: true,
            is_key: false,
            allowed_values: None,
            not_in_future: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the column as (part of) the key. Key columns are not nullable.
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self.nullable = false;
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_in_future(mut self) -> Self {
        self.not_in_future = true;
        self
    }
}

/// Rule that `earlier` must not fall after `later` within a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateOrder {
    pub earlier: String,
    pub later: String,
}

/// Declared structure of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    /// Columns in report order.
    pub columns: Vec<ColumnSpec>,
    /// Additional key columns, on top of columns flagged `is_key`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_orders: Vec<DateOrder>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            key_columns: Vec::new(),
            date_orders: Vec::new(),
        }
    }

    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Declare key columns by name.
    pub fn key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn date_order(mut self, earlier: impl Into<String>, later: impl Into<String>) -> Self {
        self.date_orders.push(DateOrder {
            earlier: earlier.into(),
            later: later.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of `name` in schema order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Effective key columns in schema order.
    pub fn key(&self) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.is_key || self.key_columns.iter().any(|k| k == &c.name))
            .collect()
    }

    /// Check the schema is usable for a run.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
        }

        if let Some(unknown) = self.key_columns.iter().find(|k| !seen.contains(k.as_str())) {
            return Err(SchemaError::UnknownKeyColumn(unknown.clone()));
        }

        for order in &self.date_orders {
            for name in [&order.earlier, &order.later] {
                match self.get(name) {
                    None => {
                        return Err(SchemaError::UnknownOrderColumn {
                            earlier: order.earlier.clone(),
                            later: order.later.clone(),
                            column: name.clone(),
                        });
                    }
                    Some(spec) if spec.expected_type != ExpectedType::Date => {
                        return Err(SchemaError::OrderColumnNotDate(name.clone()));
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

/// Target of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKey {
    pub reference_dataset: String,
    pub reference_column: String,
}

/// Foreign keys of one dataset: local column to referenced column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ForeignKeys(BTreeMap<String, ForeignKey>);

impl ForeignKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of `column -> dataset.reference_column`.
    pub fn with(
        mut self,
        column: impl Into<String>,
        reference_dataset: impl Into<String>,
        reference_column: impl Into<String>,
    ) -> Self {
        self.0.insert(
            column.into(),
            ForeignKey {
                reference_dataset: reference_dataset.into(),
                reference_column: reference_column.into(),
            },
        );
        self
    }

    pub fn get(&self, column: &str) -> Option<&ForeignKey> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ForeignKey)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every local column must be declared in `schema`.
    pub fn validate(&self, schema: &Schema) -> Result<(), SchemaError> {
        match self.0.keys().find(|column| schema.get(column).is_none()) {
            Some(unknown) => Err(SchemaError::UnknownForeignKeyColumn(unknown.clone())),
            None => Ok(()),
        }
    }
}
