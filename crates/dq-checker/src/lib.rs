//! Data Quality Checker Library
//!
//! Schema-driven data quality checks for tabular datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! Given a dataset and a declared [`Schema`], the checker reports:
//!
//! - **Missing values**: null, NaN and blank cells per column
//! - **Duplicates**: identical rows and repeated key values
//! - **Type mismatches**: values that do not coerce to the declared type
//! - **Domain violations**: values outside an allowed set, dates in the future,
//!   and dates out of order within a row
//! - **Referential violations**: foreign-key values with no match in a reference dataset
//! - **Column summaries**: missing fraction, distinct counts and numeric statistics
//!
//! Checks never modify their input and never fail because of what the data
//! contains: everything found becomes a [`Finding`] in the
//! [`DataQualityReport`]. Only malformed configuration is an error.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dq_checker::{
//!     ColumnSpec, DataQualityChecker, Dataset, ExpectedType, ForeignKeys, References, Schema,
//! };
//!
//! let products = Dataset::from_csv("products", "data/products.csv")?;
//! let brands = Dataset::from_csv("brands", "data/brands.csv")?;
//!
//! let schema = Schema::new(vec![
//!     ColumnSpec::new("BARCODE", ExpectedType::Integer).key(),
//!     ColumnSpec::new("BRAND_ID", ExpectedType::Integer),
//! ]);
//! let foreign_keys = ForeignKeys::new().with("BRAND_ID", "brands", "ID");
//! let references = References::new().with(&brands);
//!
//! let report = DataQualityChecker::default().check(
//!     &products,
//!     &schema,
//!     Some(&foreign_keys),
//!     &references,
//! )?;
//!
//! for finding in &report.findings {
//!     println!("[{}] {:?}: {}", finding.kind, finding.column, finding.detail);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`CheckConfig`] to adjust how values are interpreted:
//!
//! ```rust,ignore
//! use dq_checker::{CheckConfig, DataQualityChecker};
//!
//! let config = CheckConfig::builder()
//!     .flag_missing_in_nullable(false)  // Only report missing values in non-nullable columns
//!     .treat_markers_as_missing(true)   // "N/A", "null", "unknown", ... count as missing
//!     .max_detail_values(3)             // Quote at most 3 offending values per finding
//!     .build()?;
//!
//! let checker = DataQualityChecker::new(config);
//! ```
//!
//! # Rendering
//!
//! Reports serialize with serde, or render through [`ReportRenderer`] as
//! plain text, Markdown or JSON. See the [`reporting`] module.

pub mod config;
pub mod dataset;
pub mod error;
pub mod quality;
pub mod reporting;
pub mod schema;
pub mod types;

// Re-exports for convenient access
pub use config::{CheckConfig, CheckConfigBuilder, ConfigValidationError};
pub use dataset::{Dataset, MISSING_MARKERS, References, Row, Value, ValueKey};
pub use error::{CheckError, ReferenceError, Result as CheckResult, ResultExt, SchemaError};
pub use quality::DataQualityChecker;
pub use reporting::{RenderFormat, RenderOptions, RenderOptionsBuilder, ReportRenderer};
pub use schema::{ColumnSpec, DateOrder, ExpectedType, ForeignKey, ForeignKeys, Schema};
pub use types::{
    ColumnSummary, DataQualityReport, Finding, FindingKind, NumericSummary,
};
