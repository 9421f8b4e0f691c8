//! Error types for the data quality checker.
//!
//! Only malformed configuration is an error. Problems found in the data itself
//! (missing values, duplicates, mismatches) are reported as
//! [`Finding`](crate::types::Finding)s and never surface here.
//!
//! Errors are serializable so a presentation layer can display them with a
//! stable code.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The schema handed to the checker cannot drive a meaningful run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema declares no columns.
    #[error("Schema declares no columns")]
    Empty,

    /// The same column name is declared more than once.
    #[error("Column '{0}' is declared more than once in the schema")]
    DuplicateColumn(String),

    /// A key column is not declared in the schema.
    #[error("Key column '{0}' is not declared in the schema")]
    UnknownKeyColumn(String),

    /// A foreign key is declared on a column the schema does not know.
    #[error("Foreign key column '{0}' is not declared in the schema")]
    UnknownForeignKeyColumn(String),

    /// A date ordering rule names a column the schema does not know.
    #[error("Date ordering rule '{earlier}' <= '{later}' names unknown column '{column}'")]
    UnknownOrderColumn {
        earlier: String,
        later: String,
        column: String,
    },

    /// A date ordering rule names a column that is not declared as a date.
    #[error("Date ordering rule uses column '{0}', which is not declared as a date")]
    OrderColumnNotDate(String),
}

/// A foreign key points at a reference that was not supplied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The referenced dataset was not passed to the check.
    #[error(
        "Foreign key '{column}' references dataset '{dataset}', which was not supplied to the check"
    )]
    MissingDataset { column: String, dataset: String },
}

/// The main error type for checker operations.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Invalid schema configuration.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Invalid foreign-key configuration.
    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// Invalid checker or renderer configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CheckError>,
    },
}

impl CheckError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CheckError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for callers that render errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Reference(_) => "REFERENCE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True for caller mistakes in schema or foreign-key configuration.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Reference(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CheckError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CheckError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CheckError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CheckError::from(SchemaError::Empty).error_code(),
            "SCHEMA_ERROR"
        );
        assert_eq!(
            CheckError::from(ReferenceError::MissingDataset {
                column: "BRAND_ID".to_string(),
                dataset: "brands".to_string(),
            })
            .error_code(),
            "REFERENCE_ERROR"
        );
    }

    #[test]
    fn test_message_names_offending_column() {
        let error = CheckError::from(SchemaError::UnknownKeyColumn("RECEIPT_ID".to_string()));
        assert!(error.to_string().contains("RECEIPT_ID"));

        let error = CheckError::from(ReferenceError::MissingDataset {
            column: "BRAND_ID".to_string(),
            dataset: "brands".to_string(),
        });
        let message = error.to_string();
        assert!(message.contains("BRAND_ID"));
        assert!(message.contains("brands"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(CheckError::from(SchemaError::Empty).is_configuration());
        assert!(
            CheckError::from(SchemaError::Empty)
                .with_context("checking users")
                .is_configuration()
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(!CheckError::from(io).is_configuration());
    }

    #[test]
    fn test_error_serialization() {
        let error = CheckError::from(SchemaError::DuplicateColumn("ID".to_string()));
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("SCHEMA_ERROR"));
        assert!(json.contains("ID"));
    }

    #[test]
    fn test_with_context() {
        let error = CheckError::from(SchemaError::Empty).with_context("While checking products");
        assert!(error.to_string().contains("While checking products"));
        assert_eq!(error.error_code(), "SCHEMA_ERROR");
    }
}
