//! Cell values and their grouping identity.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strings commonly used in exports to stand in for a missing value.
pub const MISSING_MARKERS: [&str; 8] = [
    "error", "unknown", "n/a", "na", "null", "missing", "none", "#n/a",
];

/// Largest magnitude at which an integral float still maps exactly onto an `i64`.
const EXACT_INTEGRAL_FLOAT: f64 = 9_007_199_254_740_992.0;

/// A single cell of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null / absent marker.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Null, NaN, or a string that is empty after trimming.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// A string equal (case-insensitively, after trimming) to one of [`MISSING_MARKERS`].
    pub fn is_missing_marker(&self) -> bool {
        match self {
            Value::String(s) => {
                let lower = s.trim().to_ascii_lowercase();
                MISSING_MARKERS.iter().any(|&marker| lower == marker)
            }
            _ => false,
        }
    }

    /// Grouping identity used by duplicate detection and distinct counts.
    ///
    /// Returns `None` for missing values. Strings are trimmed, and integral
    /// floats share the identity of the equal integer.
    pub fn key(&self) -> Option<ValueKey> {
        if self.is_missing() {
            return None;
        }
        let key = match self {
            Value::Null => return None,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Integer(i) => ValueKey::Integer(*i),
            Value::Float(f) => float_key(*f),
            Value::String(s) => ValueKey::Text(s.trim().to_string()),
            Value::Date(d) => ValueKey::Date(*d),
            Value::DateTime(dt) => ValueKey::DateTime(*dt),
        };
        Some(key)
    }

    /// Identity used to match foreign-key values across datasets.
    ///
    /// Like [`Value::key`], but integer text matches the equal integer, since
    /// the two sides of a join are often loaded with different inferred types.
    pub fn join_key(&self) -> Option<ValueKey> {
        match self.key()? {
            ValueKey::Text(text) => match text.parse::<i64>() {
                Ok(i) => Some(ValueKey::Integer(i)),
                Err(_) => Some(ValueKey::Text(text)),
            },
            other => Some(other),
        }
    }
}

fn float_key(f: f64) -> ValueKey {
    if f.fract() == 0.0 && f.abs() < EXACT_INTEGRAL_FLOAT {
        ValueKey::Integer(f as i64)
    } else {
        // -0.0 and 0.0 are caught by the integral branch, so bits are canonical here
        ValueKey::Float(f.to_bits())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

/// Hashable, totally ordered identity of a non-missing [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Bool(bool),
    Integer(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing() {
        assert!(Value::Null.is_missing());
        assert!(Value::from("").is_missing());
        assert!(Value::from("   \t").is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::from("x").is_missing());
        assert!(!Value::Integer(0).is_missing());
        assert!(!Value::Bool(false).is_missing());
    }

    #[test]
    fn test_missing_markers() {
        assert!(Value::from("N/A").is_missing_marker());
        assert!(Value::from(" null ").is_missing_marker());
        assert!(!Value::from("Nancy").is_missing_marker());
        assert!(!Value::Null.is_missing_marker());
    }

    #[test]
    fn test_key_trims_strings() {
        assert_eq!(Value::from("  abc ").key(), Value::from("abc").key());
        assert_ne!(Value::from("a b").key(), Value::from("ab").key());
        assert_eq!(Value::from(" ").key(), None);
    }

    #[test]
    fn test_key_unifies_integral_floats() {
        assert_eq!(Value::Float(3.0).key(), Some(ValueKey::Integer(3)));
        assert_eq!(Value::Float(-0.0).key(), Value::Float(0.0).key());
        assert_ne!(Value::Float(3.5).key(), Value::Integer(3).key());
    }

    #[test]
    fn test_join_key_matches_integer_text() {
        assert_eq!(Value::from(" 42 ").join_key(), Value::Integer(42).join_key());
        assert_eq!(Value::Float(42.0).join_key(), Value::Integer(42).join_key());
        assert_eq!(Value::from("BRAND-1").join_key(), Some(ValueKey::Text("BRAND-1".into())));
        // plain keys keep text and numbers apart
        assert_ne!(Value::from("42").key(), Value::Integer(42).key());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 7, 1.5, "2024-01-02"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Integer(7),
                Value::Float(1.5),
                Value::String("2024-01-02".into()),
            ]
        );
    }
}
