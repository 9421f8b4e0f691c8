//! Coercion of cell values to declared types.

use super::CheckContext;
use crate::dataset::Value;
use crate::schema::ExpectedType;
use crate::types::{Finding, FindingKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried, in order, for text holding a date with a time of day.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Formats tried, in order, for text holding a plain date.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Bound within which `f64 -> i64` is lossless for integral values.
const I64_FLOAT_BOUND: f64 = i64::MAX as f64;

pub(crate) fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) => integral(*f),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < I64_FLOAT_BOUND).then_some(f as i64)
}

pub(crate) fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) if f.is_finite() => Some(*f),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Dates read as midnight.
pub(crate) fn coerce_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::String(s) => parse_datetime_text(s),
        _ => None,
    }
}

pub(crate) fn coerce_date(value: &Value) -> Option<NaiveDate> {
    coerce_datetime(value).map(|dt| dt.date())
}

/// Parse RFC 3339 timestamps (normalized to UTC), the formats in
/// [`DATETIME_FORMATS`] with an optional trailing `Z`, or a plain date.
pub(crate) fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    let without_zone = trimmed.strip_suffix('Z').unwrap_or(trimmed).trim_end();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_zone, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(without_zone, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whether a non-missing value coerces to `expected`. Anything reads as a string.
pub(crate) fn conforms(value: &Value, expected: ExpectedType) -> bool {
    match expected {
        ExpectedType::String => true,
        ExpectedType::Integer => coerce_integer(value).is_some(),
        ExpectedType::Float => coerce_float(value).is_some(),
        ExpectedType::Date => coerce_datetime(value).is_some(),
    }
}

/// One `type_mismatch` finding per column holding non-missing values that do
/// not coerce to the declared type.
pub(crate) fn type_mismatches(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for spec in &ctx.schema.columns {
        if spec.expected_type == ExpectedType::String {
            continue;
        }

        let mut present = 0;
        let mut failing = Vec::new();
        for (idx, row) in ctx.dataset.rows().iter().enumerate() {
            let value = row.get(&spec.name);
            if ctx.is_missing(value) {
                continue;
            }
            present += 1;
            if !conforms(value, spec.expected_type) {
                failing.push(idx);
            }
        }
        if failing.is_empty() {
            continue;
        }

        let detail = format!(
            "{} of {} non-missing values in '{}' cannot be read as {} (e.g. {})",
            failing.len(),
            present,
            spec.name,
            spec.expected_type,
            ctx.examples(&spec.name, &failing)
        );
        findings.push(Finding::new(
            FindingKind::TypeMismatch,
            Some(spec.name.as_str()),
            failing,
            detail,
        ));
    }

    findings
}
