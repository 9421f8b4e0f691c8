//! Conversion from polars `DataFrame`s.

use super::{Dataset, Row, Value};
use crate::error::{Result, ResultExt};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Rows scanned to infer column types; 0 reads every column as text.
const INFER_SCHEMA_ROWS: usize = 100;

impl Dataset {
    /// Materialize a dataset from a polars `DataFrame`.
    ///
    /// Nulls become [`Value::Null`]; integer, float, boolean, string, date and
    /// datetime cells map to the matching variant. Any other dtype is kept as
    /// its display text.
    pub fn from_dataframe(name: impl Into<String>, df: &DataFrame) -> Result<Dataset> {
        let name = name.into();
        let mut rows: Vec<Row> = (0..df.height()).map(|_| Row::new()).collect();

        for column in df.get_columns() {
            let column_name = column.name().to_string();
            let series = column.as_materialized_series();
            for (idx, row) in rows.iter_mut().enumerate() {
                let cell = series
                    .get(idx)
                    .context(format!("Reading column '{}' row {}", column_name, idx))?;
                row.insert(column_name.clone(), Value::from(cell));
            }
        }

        debug!(
            "Materialized dataset '{}' with {} rows and {} columns",
            name,
            df.height(),
            df.width()
        );
        Ok(Dataset::from_rows(name, rows))
    }

    /// Read a headered CSV file through polars and materialize it.
    ///
    /// Types are inferred from the first 100 rows. When a later value does not
    /// fit the inferred type, the file is read again with every column as
    /// text, leaving coercion to the type check. Empty fields read as null.
    pub fn from_csv(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let df = match read_csv(path, Some(INFER_SCHEMA_ROWS)) {
            Ok(df) => df,
            Err(e) => {
                debug!("Typed loading of {} failed: {}", path.display(), e);
                read_csv(path, Some(0)).context(format!("Parsing {}", path.display()))?
            }
        };
        debug!("Loaded {} with shape {:?}", path.display(), df.shape());

        Dataset::from_dataframe(name, &df)
    }
}

fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_length)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

impl From<AnyValue<'_>> for Value {
    fn from(cell: AnyValue<'_>) -> Self {
        match cell {
            AnyValue::Null => Value::Null,
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::String(s) => Value::String(s.to_string()),
            AnyValue::StringOwned(s) => Value::String(s.to_string()),
            AnyValue::Int8(v) => Value::Integer(i64::from(v)),
            AnyValue::Int16(v) => Value::Integer(i64::from(v)),
            AnyValue::Int32(v) => Value::Integer(i64::from(v)),
            AnyValue::Int64(v) => Value::Integer(v),
            AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
            AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
            AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Float(v as f64),
            },
            AnyValue::Float32(v) => Value::Float(f64::from(v)),
            AnyValue::Float64(v) => Value::Float(v),
            AnyValue::Date(days) => days_to_date(days).map_or(Value::Null, Value::Date),
            AnyValue::Datetime(ts, unit, _) => {
                timestamp_to_datetime(ts, unit).map_or(Value::Null, Value::DateTime)
            }
            other => Value::String(other.to_string()),
        }
    }
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn timestamp_to_datetime(ts: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let datetime = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ts)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts),
    };
    datetime.map(|dt| dt.naive_utc())
}
