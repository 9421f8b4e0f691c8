use crate::schema::ExpectedType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a detected issue.
///
/// Variants are declared in alphabetical order of their serialized names, so
/// the derived `Ord` is the report ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DomainViolation,
    DuplicateKey,
    DuplicateRow,
    MissingValue,
    ReferentialViolation,
    TypeMismatch,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::DomainViolation => "domain_violation",
            FindingKind::DuplicateKey => "duplicate_key",
            FindingKind::DuplicateRow => "duplicate_row",
            FindingKind::MissingValue => "missing_value",
            FindingKind::ReferentialViolation => "referential_violation",
            FindingKind::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected data-quality issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Column the issue is attached to; absent for row-level and composite-key issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Offending row positions, ascending.
    pub row_indices: Vec<usize>,
    pub detail: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        column: Option<&str>,
        row_indices: Vec<usize>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            column: column.map(str::to_string),
            row_indices,
            detail: detail.into(),
        }
    }

    pub fn first_row(&self) -> Option<usize> {
        self.row_indices.first().copied()
    }
}

/// Descriptive statistics over the coercible values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Per-column statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub expected_type: ExpectedType,
    pub missing_count: usize,
    /// `missing_count / row_count` as a fraction in `[0, 1]`; 0 for an empty dataset.
    pub missing_percentage: f64,
    /// Distinct non-missing values.
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Result of one check run.
///
/// The report is a value object: built fresh per run and never mutated by the
/// checker after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub dataset_name: String,
    pub row_count: usize,
    /// Set when the dataset has no rows.
    pub is_empty: bool,
    /// One entry per schema column, in schema order.
    pub column_summaries: Vec<ColumnSummary>,
    /// Sorted by kind, then column (schema order), then first row index.
    pub findings: Vec<Finding>,
    /// Schema columns with no missing and no repeated values.
    pub candidate_keys: Vec<String>,
    /// Columns carried by rows but not declared in the schema, sorted by name.
    pub unexpected_columns: Vec<String>,
    /// Column names with leading, trailing or inner whitespace, sorted by name.
    pub columns_with_whitespace: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl DataQualityReport {
    pub fn summary(&self, column: &str) -> Option<&ColumnSummary> {
        self.column_summaries.iter().find(|s| s.column == column)
    }

    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Total missing cells across schema columns.
    pub fn total_missing(&self) -> usize {
        self.column_summaries.iter().map(|s| s.missing_count).sum()
    }
}
