//! Configuration for the data quality checker.
//!
//! Options use the builder pattern; `build()` validates them.
//!
//! ```rust,ignore
//! use dq_checker::CheckConfig;
//!
//! let config = CheckConfig::builder()
//!     .flag_missing_in_nullable(false)
//!     .treat_markers_as_missing(true)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

/// Default number of offending values quoted in a finding's detail.
pub const DEFAULT_MAX_DETAIL_VALUES: usize = 5;

/// Options controlling how checks interpret the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether nullable columns get a `missing_value` finding.
    /// Missing values are always counted in the column summary.
    /// Default: true
    pub flag_missing_in_nullable: bool,

    /// Whether strings such as "N/A", "null" or "unknown" count as missing.
    /// Default: false
    pub treat_markers_as_missing: bool,

    /// Maximum number of offending values quoted in a finding's detail.
    /// Default: 5
    pub max_detail_values: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            flag_missing_in_nullable: true,
            treat_markers_as_missing: false,
            max_detail_values: DEFAULT_MAX_DETAIL_VALUES,
        }
    }
}

impl CheckConfig {
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_detail_values == 0 {
            return Err(ConfigValidationError::InvalidMaxDetailValues(
                self.max_detail_values,
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max_detail_values: {0} (must be at least 1)")]
    InvalidMaxDetailValues(usize),

    #[error("Invalid max_rows_listed: {0} (must be at least 1)")]
    InvalidMaxRowsListed(usize),
}

impl From<ConfigValidationError> for crate::error::CheckError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::CheckError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CheckConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CheckConfigBuilder {
    flag_missing_in_nullable: Option<bool>,
    treat_markers_as_missing: Option<bool>,
    max_detail_values: Option<usize>,
}

impl CheckConfigBuilder {
    /// Emit `missing_value` findings for nullable columns too.
    pub fn flag_missing_in_nullable(mut self, flag: bool) -> Self {
        self.flag_missing_in_nullable = Some(flag);
        self
    }

    /// Count placeholder strings ("N/A", "null", ...) as missing.
    pub fn treat_markers_as_missing(mut self, treat: bool) -> Self {
        self.treat_markers_as_missing = Some(treat);
        self
    }

    pub fn max_detail_values(mut self, max: usize) -> Self {
        self.max_detail_values = Some(max);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CheckConfig` or an error if validation fails.
    pub fn build(self) -> Result<CheckConfig, ConfigValidationError> {
        let config = CheckConfig {
            flag_missing_in_nullable: self.flag_missing_in_nullable.unwrap_or(true),
            treat_markers_as_missing: self.treat_markers_as_missing.unwrap_or(false),
            max_detail_values: self
                .max_detail_values
                .unwrap_or(DEFAULT_MAX_DETAIL_VALUES),
        };

        config.validate()?;
        Ok(config)
    }
}
