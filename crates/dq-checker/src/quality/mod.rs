//! Data quality checks.
//!
//! [`DataQualityChecker`] runs every check over one dataset and aggregates the
//! results into a [`DataQualityReport`]:
//! - missing values per column
//! - full-row duplicates and duplicate keys
//! - values that do not coerce to the declared type
//! - domain violations (allowed values, future dates, date ordering)
//! - foreign-key values with no match in a reference dataset
//!
//! Malformed configuration fails the run; everything found in the data is a
//! [`Finding`](crate::types::Finding).

pub(crate) mod coercion;
mod domain;
mod duplicates;
mod missing;
mod referential;
mod summary;

use crate::config::CheckConfig;
use crate::dataset::{Dataset, References, Value, ValueKey};
use crate::error::Result;
use crate::schema::{ForeignKeys, Schema};
use crate::types::{DataQualityReport, Finding};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Runs the data quality checks for one dataset at a time.
///
/// Holds only immutable configuration, so a single checker can be shared
/// between threads checking different datasets.
#[derive(Debug, Clone, Default)]
pub struct DataQualityChecker {
    config: CheckConfig,
}

impl DataQualityChecker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check `dataset` against `schema`, stamping the report with the current time.
    ///
    /// `references` must hold every dataset named by `foreign_keys`. The
    /// foreign-key check is skipped when `foreign_keys` is `None`.
    pub fn check(
        &self,
        dataset: &Dataset,
        schema: &Schema,
        foreign_keys: Option<&ForeignKeys>,
        references: &References<'_>,
    ) -> Result<DataQualityReport> {
        self.check_at(dataset, schema, foreign_keys, references, Utc::now())
    }

    /// Same as [`check`](Self::check) with an explicit report timestamp.
    ///
    /// The timestamp is also the reference point for `not_in_future` columns,
    /// so identical inputs and timestamp always yield identical reports.
    pub fn check_at(
        &self,
        dataset: &Dataset,
        schema: &Schema,
        foreign_keys: Option<&ForeignKeys>,
        references: &References<'_>,
        generated_at: DateTime<Utc>,
    ) -> Result<DataQualityReport> {
        schema.validate()?;
        let links = match foreign_keys {
            Some(fks) => {
                fks.validate(schema)?;
                referential::resolve(fks, references)?
            }
            None => Vec::new(),
        };

        let ctx = CheckContext {
            dataset,
            schema,
            config: &self.config,
            generated_at,
        };

        debug!(
            "Checking dataset '{}' ({} rows, {} schema columns)",
            dataset.name(),
            dataset.len(),
            schema.len()
        );
        if dataset.is_empty() {
            warn!("Dataset '{}' is empty", dataset.name());
        }

        let mut findings = Vec::new();
        findings.extend(missing::missing_values(&ctx));
        findings.extend(duplicates::duplicate_rows(&ctx));
        findings.extend(duplicates::duplicate_keys(&ctx));
        findings.extend(coercion::type_mismatches(&ctx));
        findings.extend(domain::domain_violations(&ctx));
        findings.extend(referential::referential_violations(&ctx, &links));
        sort_findings(&mut findings, schema);

        let column_summaries = summary::column_summaries(&ctx);
        let candidate_keys = summary::candidate_keys(&ctx, &column_summaries);
        let unexpected_columns = summary::unexpected_columns(&ctx);
        let columns_with_whitespace = summary::columns_with_whitespace(&ctx);

        debug!(
            "Dataset '{}': {} findings, {} unexpected columns",
            dataset.name(),
            findings.len(),
            unexpected_columns.len()
        );

        Ok(DataQualityReport {
            dataset_name: dataset.name().to_string(),
            row_count: dataset.len(),
            is_empty: dataset.is_empty(),
            column_summaries,
            findings,
            candidate_keys,
            unexpected_columns,
            columns_with_whitespace,
            generated_at,
        })
    }
}

/// Inputs shared by the individual checks of one run.
pub(crate) struct CheckContext<'a> {
    pub dataset: &'a Dataset,
    pub schema: &'a Schema,
    pub config: &'a CheckConfig,
    pub generated_at: DateTime<Utc>,
}

impl CheckContext<'_> {
    pub fn is_missing(&self, value: &Value) -> bool {
        value.is_missing() || (self.config.treat_markers_as_missing && value.is_missing_marker())
    }

    /// Grouping identity, `None` when the value counts as missing.
    pub fn key(&self, value: &Value) -> Option<ValueKey> {
        if self.is_missing(value) {
            None
        } else {
            value.key()
        }
    }

    pub fn missing_rows(&self, column: &str) -> Vec<usize> {
        self.dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| self.is_missing(row.get(column)))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Distinct offending values of `column` at `rows`, quoted, up to the configured limit.
    pub fn examples(&self, column: &str, rows: &[usize]) -> String {
        let mut seen = BTreeSet::new();
        let mut quoted = Vec::new();
        for &idx in rows {
            let text = self.dataset.value(idx, column).to_string();
            if seen.insert(text.clone()) {
                quoted.push(format!("\"{}\"", text));
                if quoted.len() == self.config.max_detail_values {
                    break;
                }
            }
        }
        quoted.join(", ")
    }
}

/// Order by kind, then column (row-level first, then schema order), then
/// first offending row, then detail.
fn sort_findings(findings: &mut [Finding], schema: &Schema) {
    let column_rank = |finding: &Finding| match &finding.column {
        None => 0,
        Some(column) => schema.position(column).map_or(usize::MAX, |p| p + 1),
    };
    findings.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| column_rank(a).cmp(&column_rank(b)))
            .then_with(|| cmp_first_row(a, b))
            .then_with(|| a.detail.cmp(&b.detail))
    });
}

fn cmp_first_row(a: &Finding, b: &Finding) -> Ordering {
    a.first_row().cmp(&b.first_row())
}
