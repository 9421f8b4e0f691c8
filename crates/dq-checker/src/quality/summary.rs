//! Per-column statistics and dataset-level structure hints.

use super::CheckContext;
use super::coercion::{coerce_float, coerce_integer};
use crate::schema::{ColumnSpec, ExpectedType};
use crate::types::{ColumnSummary, NumericSummary};
use std::collections::{BTreeSet, HashSet};

/// One summary per schema column, in schema order.
pub(crate) fn column_summaries(ctx: &CheckContext<'_>) -> Vec<ColumnSummary> {
    let total = ctx.dataset.len();
    ctx.schema
        .columns
        .iter()
        .map(|spec| {
            let missing_count = ctx.missing_rows(&spec.name).len();
            let distinct_count = ctx
                .dataset
                .rows()
                .iter()
                .filter_map(|row| ctx.key(row.get(&spec.name)))
                .collect::<HashSet<_>>()
                .len();
            let missing_percentage = if total == 0 {
                0.0
            } else {
                missing_count as f64 / total as f64
            };

            ColumnSummary {
                column: spec.name.clone(),
                expected_type: spec.expected_type,
                missing_count,
                missing_percentage,
                distinct_count,
                numeric: numeric_summary(ctx, spec),
            }
        })
        .collect()
}

fn numeric_summary(ctx: &CheckContext<'_>, spec: &ColumnSpec) -> Option<NumericSummary> {
    if !spec.expected_type.is_numeric() {
        return None;
    }
    let mut values: Vec<f64> = ctx
        .dataset
        .rows()
        .iter()
        .map(|row| row.get(&spec.name))
        .filter(|value| !ctx.is_missing(value))
        .filter_map(|value| match spec.expected_type {
            ExpectedType::Integer => coerce_integer(value).map(|i| i as f64),
            _ => coerce_float(value),
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    });

    Some(NumericSummary {
        count,
        mean,
        std,
        min: values[0],
        p25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear interpolation between closest ranks over sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Schema columns whose values are all present and all distinct.
pub(crate) fn candidate_keys(ctx: &CheckContext<'_>, summaries: &[ColumnSummary]) -> Vec<String> {
    if ctx.dataset.is_empty() {
        return Vec::new();
    }
    summaries
        .iter()
        .filter(|s| s.missing_count == 0 && s.distinct_count == ctx.dataset.len())
        .map(|s| s.column.clone())
        .collect()
}

pub(crate) fn unexpected_columns(ctx: &CheckContext<'_>) -> Vec<String> {
    ctx.dataset
        .column_names()
        .into_iter()
        .filter(|name| ctx.schema.get(name).is_none())
        .map(str::to_string)
        .collect()
}

/// Declared or carried column names containing any whitespace.
pub(crate) fn columns_with_whitespace(ctx: &CheckContext<'_>) -> Vec<String> {
    let declared = ctx.schema.columns.iter().map(|c| c.name.as_str());
    ctx.dataset
        .column_names()
        .into_iter()
        .chain(declared)
        .filter(|name| name.chars().any(char::is_whitespace))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use crate::dataset::{Dataset, Row, Value};
    use crate::quality::test_support::context;
    use crate::schema::Schema;
    use pretty_assertions::assert_eq;

    fn receipts() -> (Dataset, Schema) {
        let dataset = Dataset::from_rows(
            "receipts",
            vec![
                Row::new().with("ID", "r1").with("POINTS", 10).with("SPENT", "1.5"),
                Row::new().with("ID", "r2").with("POINTS", 20).with("SPENT", 2.5),
                Row::new().with("ID", "r3").with("POINTS", "30").with("SPENT", Value::Null),
                Row::new()
                    .with("ID", "r4")
                    .with("POINTS", 40)
                    .with("SPENT", "lots")
                    .with("NOTE", "late"),
            ],
        );
        let schema = Schema::new(vec![
            ColumnSpec::new("ID", ExpectedType::String),
            ColumnSpec::new("POINTS", ExpectedType::Integer),
            ColumnSpec::new("SPENT", ExpectedType::Float),
        ]);
        (dataset, schema)
    }

    #[test]
    fn test_column_summaries() {
        let (dataset, schema) = receipts();
        let config = CheckConfig::default();
        let summaries = column_summaries(&context(&dataset, &schema, &config));

        assert_eq!(summaries.len(), 3);
        let spent = &summaries[2];
        assert_eq!(spent.missing_count, 1);
        assert_eq!(spent.missing_percentage, 0.25);
        assert_eq!(spent.distinct_count, 3);

        let numeric = spent.numeric.as_ref().unwrap();
        assert_eq!(numeric.count, 2);
        assert_eq!(numeric.mean, 2.0);
        assert!(summaries[0].numeric.is_none());
    }

    #[test]
    fn test_numeric_summary_quantiles() {
        let (dataset, schema) = receipts();
        let config = CheckConfig::default();
        let summaries = column_summaries(&context(&dataset, &schema, &config));
        let points = summaries[1].numeric.as_ref().unwrap();

        assert_eq!(points.count, 4);
        assert_eq!(points.min, 10.0);
        assert_eq!(points.p25, 17.5);
        assert_eq!(points.median, 25.0);
        assert_eq!(points.p75, 32.5);
        assert_eq!(points.max, 40.0);
        let std = points.std.unwrap();
        assert!((std - 12.909_944_487_358_056).abs() < 1e-9);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let dataset = Dataset::from_rows("t", vec![Row::new().with("N", 3)]);
        let schema = Schema::new(vec![ColumnSpec::new("N", ExpectedType::Float)]);
        let config = CheckConfig::default();
        let summaries = column_summaries(&context(&dataset, &schema, &config));
        let numeric = summaries[0].numeric.as_ref().unwrap();

        assert_eq!(numeric.std, None);
        assert_eq!(numeric.median, 3.0);
    }

    #[test]
    fn test_candidate_keys() {
        let (dataset, schema) = receipts();
        let config = CheckConfig::default();
        let ctx = context(&dataset, &schema, &config);
        let summaries = column_summaries(&ctx);

        assert_eq!(candidate_keys(&ctx, &summaries), vec!["ID", "POINTS"]);
    }

    #[test]
    fn test_unexpected_columns() {
        let (dataset, schema) = receipts();
        let config = CheckConfig::default();
        assert_eq!(
            unexpected_columns(&context(&dataset, &schema, &config)),
            vec!["NOTE"]
        );
    }

    #[test]
    fn test_columns_with_whitespace() {
        let dataset = Dataset::from_rows(
            "users",
            vec![Row::new()
                .with("ID", "u1")
                .with("FIRST NAME", "Ada")
                .with("STATE ", "WI")],
        );
        let schema = Schema::new(vec![
            ColumnSpec::new("ID", ExpectedType::String),
            ColumnSpec::new(" CREATED_DATE", ExpectedType::Date),
            ColumnSpec::new("STATE ", ExpectedType::String),
        ]);
        let config = CheckConfig::default();

        assert_eq!(
            columns_with_whitespace(&context(&dataset, &schema, &config)),
            vec![" CREATED_DATE", "FIRST NAME", "STATE "]
        );
    }

    #[test]
    fn test_date_column_has_no_numeric_summary() {
        let dataset = Dataset::from_rows("t", vec![Row::new().with("D", "2024-01-01")]);
        let schema = Schema::new(vec![ColumnSpec::new("D", ExpectedType::Date)]);
        let config = CheckConfig::default();
        let summaries = column_summaries(&context(&dataset, &schema, &config));
        assert!(summaries[0].numeric.is_none());
    }
}
