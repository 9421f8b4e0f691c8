use crate::config::ConfigValidationError;
use crate::error::{CheckError, Result};
use crate::types::{ColumnSummary, DataQualityReport, Finding, FindingKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default number of row indices listed per finding before truncating.
pub const DEFAULT_MAX_ROWS_LISTED: usize = 10;

/// Default number of decimals for percentages.
pub const DEFAULT_PERCENTAGE_DECIMALS: usize = 1;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl RenderFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RenderFormat::Text => "txt",
            RenderFormat::Markdown => "md",
            RenderFormat::Json => "json",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderFormat::Text => "text",
            RenderFormat::Markdown => "markdown",
            RenderFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RenderFormat {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(RenderFormat::Text),
            "markdown" | "md" => Ok(RenderFormat::Markdown),
            "json" => Ok(RenderFormat::Json),
            other => Err(CheckError::InvalidConfig(format!(
                "Unknown report format '{}' (expected text, markdown or json)",
                other
            ))),
        }
    }
}

/// Options controlling how a report is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Default: text
    pub format: RenderFormat,
    /// Row indices listed per finding; the rest are counted. Default: 10
    pub max_rows_listed: usize,
    /// Default: 1
    pub percentage_decimals: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: RenderFormat::default(),
            max_rows_listed: DEFAULT_MAX_ROWS_LISTED,
            percentage_decimals: DEFAULT_PERCENTAGE_DECIMALS,
        }
    }
}

impl RenderOptions {
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.max_rows_listed == 0 {
            return Err(ConfigValidationError::InvalidMaxRowsListed(
                self.max_rows_listed,
            ));
        }
        Ok(())
    }
}

/// Builder for [`RenderOptions`].
#[derive(Debug, Default)]
pub struct RenderOptionsBuilder {
    format: Option<RenderFormat>,
    max_rows_listed: Option<usize>,
    percentage_decimals: Option<usize>,
}

impl RenderOptionsBuilder {
    pub fn format(mut self, format: RenderFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn max_rows_listed(mut self, max: usize) -> Self {
        self.max_rows_listed = Some(max);
        self
    }

    pub fn percentage_decimals(mut self, decimals: usize) -> Self {
        self.percentage_decimals = Some(decimals);
        self
    }

    pub fn build(self) -> std::result::Result<RenderOptions, ConfigValidationError> {
        let options = RenderOptions {
            format: self.format.unwrap_or_default(),
            max_rows_listed: self.max_rows_listed.unwrap_or(DEFAULT_MAX_ROWS_LISTED),
            percentage_decimals: self
                .percentage_decimals
                .unwrap_or(DEFAULT_PERCENTAGE_DECIMALS),
        };

        options.validate()?;
        Ok(options)
    }
}

/// Renders reports according to its [`RenderOptions`].
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    options: RenderOptions,
}

impl ReportRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, report: &DataQualityReport) -> Result<String> {
        match self.options.format {
            RenderFormat::Text => Ok(self.render_text(report)),
            RenderFormat::Markdown => Ok(self.render_markdown(report)),
            RenderFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// `<dataset>_quality_report.<ext>`, with characters unsafe in file names replaced.
    pub fn file_name(&self, report: &DataQualityReport) -> String {
        let stem: String = report
            .dataset_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "{}_quality_report.{}",
            stem,
            self.options.format.extension()
        )
    }

    /// Render `report` into `output_dir`, creating the directory if needed.
    pub fn write_to_file(
        &self,
        report: &DataQualityReport,
        output_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let report_path = output_dir.join(self.file_name(report));
        fs::write(&report_path, self.render(report)?)?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    fn render_text(&self, report: &DataQualityReport) -> String {
        let mut lines = vec![
            format!("Data quality report: {}", report.dataset_name),
            format!("Generated at: {}", timestamp(report)),
        ];
        if report.is_empty {
            lines.push("Rows: 0 (empty dataset)".to_string());
        } else {
            lines.push(format!("Rows: {}", report.row_count));
        }
        lines.push(format!("Missing cells: {}", report.total_missing()));

        lines.push(String::new());
        lines.push("Columns:".to_string());
        for summary in &report.column_summaries {
            lines.push(format!("  {}", self.column_line(summary)));
        }
        lines.push(String::new());
        lines.push(format!("Candidate keys: {}", list_or_none(&report.candidate_keys)));
        lines.push(format!(
            "Unexpected columns: {}",
            list_or_none(&report.unexpected_columns)
        ));
        lines.push(format!(
            "Columns with whitespace in name: {}",
            quoted_or_none(&report.columns_with_whitespace)
        ));

        lines.push(String::new());
        if report.findings.is_empty() {
            lines.push("Findings: none".to_string());
        } else {
            lines.push(format!("Findings ({}):", report.findings.len()));
            for finding in &report.findings {
                lines.push(format!(
                    "  [{}] {}: {}",
                    finding.kind,
                    finding.column.as_deref().unwrap_or("-"),
                    finding.detail
                ));
                lines.push(format!("      rows: {}", self.rows(&finding.row_indices)));
            }
        }

        lines.push(String::new());
        let actions = action_items(report);
        if actions.is_empty() {
            lines.push("Action required: none".to_string());
        } else {
            lines.push("Action required:".to_string());
            lines.extend(actions.iter().map(|a| format!("  - {}", a)));
        }

        debug!("Rendered text report for '{}'", report.dataset_name);
        lines.join("\n") + "\n"
    }

    fn render_markdown(&self, report: &DataQualityReport) -> String {
        let mut lines = vec![
            format!("# Data quality report: {}", report.dataset_name),
            String::new(),
            format!("- Generated at: {}", timestamp(report)),
            format!("- Rows: {}", report.row_count),
            format!("- Missing cells: {}", report.total_missing()),
            format!("- Candidate keys: {}", list_or_none(&report.candidate_keys)),
            format!(
                "- Unexpected columns: {}",
                list_or_none(&report.unexpected_columns)
            ),
            format!(
                "- Columns with whitespace in name: {}",
                escape_cell(&quoted_or_none(&report.columns_with_whitespace))
            ),
        ];
        if report.is_empty {
            lines.push("- The dataset is empty.".to_string());
        }

        lines.push(String::new());
        lines.push("## Columns".to_string());
        lines.push(String::new());
        lines.push("| Column | Type | Missing | Missing % | Distinct | Mean | Min | Median | Max |".to_string());
        lines.push("|---|---|---|---|---|---|---|---|---|".to_string());
        for summary in &report.column_summaries {
            let (mean, min, median, max) = match &summary.numeric {
                Some(n) => (
                    format!("{:.2}", n.mean),
                    n.min.to_string(),
                    n.median.to_string(),
                    n.max.to_string(),
                ),
                None => Default::default(),
            };
            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                escape_cell(&summary.column),
                summary.expected_type,
                summary.missing_count,
                self.percent(summary.missing_percentage),
                summary.distinct_count,
                mean,
                min,
                median,
                max
            ));
        }

        lines.push(String::new());
        lines.push("## Findings".to_string());
        lines.push(String::new());
        if report.findings.is_empty() {
            lines.push("No findings.".to_string());
        } else {
            lines.push("| Kind | Column | Rows | Detail |".to_string());
            lines.push("|---|---|---|---|".to_string());
            for finding in &report.findings {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    finding.kind,
                    escape_cell(finding.column.as_deref().unwrap_or("-")),
                    self.rows(&finding.row_indices),
                    escape_cell(&finding.detail)
                ));
            }
        }

        lines.push(String::new());
        lines.push("## Action required".to_string());
        lines.push(String::new());
        let actions = action_items(report);
        if actions.is_empty() {
            lines.push("Nothing to do.".to_string());
        } else {
            lines.extend(actions.iter().map(|a| format!("- {}", a)));
        }

        debug!("Rendered markdown report for '{}'", report.dataset_name);
        lines.join("\n") + "\n"
    }

    fn column_line(&self, summary: &ColumnSummary) -> String {
        let mut line = format!(
            "{} ({}): {} missing ({}), {} distinct",
            summary.column,
            summary.expected_type,
            summary.missing_count,
            self.percent(summary.missing_percentage),
            summary.distinct_count
        );
        if let Some(n) = &summary.numeric {
            line.push_str(&format!(
                "; mean {:.2}, std {}, min {}, median {}, max {}",
                n.mean,
                n.std.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s)),
                n.min,
                n.median,
                n.max
            ));
        }
        line
    }

    fn percent(&self, fraction: f64) -> String {
        format!(
            "{:.*}%",
            self.options.percentage_decimals,
            fraction * 100.0
        )
    }

    fn rows(&self, rows: &[usize]) -> String {
        let listed = rows
            .iter()
            .take(self.options.max_rows_listed)
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match rows.len().saturating_sub(self.options.max_rows_listed) {
            0 => listed,
            more => format!("{} (+{} more)", listed, more),
        }
    }
}

/// One suggested action per finding, plus one each for undeclared columns
/// and column names with whitespace.
fn action_items(report: &DataQualityReport) -> Vec<String> {
    let mut items: Vec<String> = report
        .findings
        .iter()
        .map(|f| format!("{}: {}", action_label(report, f), f.detail))
        .collect();
    if !report.unexpected_columns.is_empty() {
        items.push(format!(
            "Review undeclared columns: {}",
            report.unexpected_columns.join(", ")
        ));
    }
    if !report.columns_with_whitespace.is_empty() {
        items.push(format!(
            "Rename columns with whitespace in their names: {}",
            quoted(&report.columns_with_whitespace)
        ));
    }
    items
}

fn action_label(report: &DataQualityReport, finding: &Finding) -> &'static str {
    match finding.kind {
        FindingKind::DomainViolation => "Correct invalid values",
        FindingKind::DuplicateKey => "Resolve duplicate keys",
        FindingKind::DuplicateRow => "Remove duplicate rows",
        FindingKind::MissingValue if is_entirely_missing(report, finding) => {
            "Remove or populate empty column"
        }
        FindingKind::MissingValue => "Handle missing data",
        FindingKind::ReferentialViolation => "Resolve unmatched references",
        FindingKind::TypeMismatch => "Standardize data types",
    }
}

fn timestamp(report: &DataQualityReport) -> String {
    report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// A per-column missing finding covering every row of a non-empty dataset.
fn is_entirely_missing(report: &DataQualityReport, finding: &Finding) -> bool {
    finding.column.is_some() && !report.is_empty && finding.row_indices.len() == report.row_count
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quoted_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        quoted(names)
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
