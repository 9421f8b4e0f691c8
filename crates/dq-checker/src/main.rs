//! CLI entry point for the data quality checker.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dq_checker::{
    CheckConfig, DataQualityChecker, Dataset, ForeignKeys, References, RenderFormat,
    RenderOptions, ReportRenderer, Schema,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CLI-compatible report format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliFormat {
    /// Plain text summary
    Text,
    /// Markdown document with tables
    Markdown,
    /// Pretty-printed JSON report
    Json,
}

impl From<CliFormat> for RenderFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Text => RenderFormat::Text,
            CliFormat::Markdown => RenderFormat::Markdown,
            CliFormat::Json => RenderFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Schema-driven data quality checks for CSV datasets",
    long_about = "Checks a CSV dataset against a declared schema and reports missing values,\n\
                  duplicates, type mismatches, domain violations and unmatched foreign keys.\n\n\
                  CHECK FILE:\n  \
                  JSON object with a `schema` ({\"columns\": [...]}), an optional `name`\n  \
                  and optional `foreign_keys` ({\"COLUMN\": {\"reference_dataset\": ..., \"reference_column\": ...}}).\n\n\
                  EXAMPLES:\n  \
                  # Print a text report\n  \
                  dq-checker -i users.csv -s users.check.json\n\n  \
                  # Check foreign keys against a reference dataset\n  \
                  dq-checker -i products.csv -s products.check.json --reference brands=brands.csv\n\n  \
                  # Write a Markdown report to a directory\n  \
                  dq-checker -i users.csv -s users.check.json --format markdown -o reports/"
)]
struct Args {
    /// Path to the CSV file to check
    #[arg(short, long)]
    input: String,

    /// Path to the JSON check file (schema and foreign keys)
    #[arg(short, long)]
    schema: String,

    /// Reference dataset for foreign keys, as NAME=PATH.csv (repeatable)
    #[arg(long = "reference", value_parser = parse_reference)]
    references: Vec<(String, PathBuf)>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CliFormat,

    /// Write the report to this directory instead of stdout
    ///
    /// The report will be saved as <dataset>_quality_report.<ext>
    #[arg(short, long)]
    output: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the report)
    #[arg(short, long)]
    quiet: bool,

    /// Only report missing values in non-nullable columns
    #[arg(long)]
    no_nullable_missing: bool,

    /// Count placeholder strings such as "N/A" or "null" as missing
    #[arg(long)]
    markers_as_missing: bool,

    /// Row indices listed per finding before truncating
    #[arg(long, default_value = "10")]
    max_rows_listed: usize,
}

/// Contents of the `--schema` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckFile {
    /// Dataset name; defaults to the input file stem
    name: Option<String>,
    schema: Schema,
    #[serde(default)]
    foreign_keys: Option<ForeignKeys>,
}

fn parse_reference(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", raw)),
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let json_to_stdout = args.format == CliFormat::Json && args.output.is_none();
    init_logging(&args.log_level, args.quiet, json_to_stdout);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let check_file = load_check_file(&args.schema)?;
    let name = check_file
        .name
        .clone()
        .unwrap_or_else(|| file_stem(&args.input));

    info!("Loading dataset from: {}", args.input);
    let dataset = Dataset::from_csv(&name, &args.input)?;
    info!("Dataset '{}' loaded: {} rows", name, dataset.len());

    let reference_datasets = args
        .references
        .iter()
        .map(|(ref_name, path)| {
            info!("Loading reference '{}' from: {}", ref_name, path.display());
            Dataset::from_csv(ref_name, path)
                .with_context(|| format!("Loading reference dataset '{}'", ref_name))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut references = References::new();
    for reference in &reference_datasets {
        references.insert(reference);
    }

    let config = CheckConfig::builder()
        .flag_missing_in_nullable(!args.no_nullable_missing)
        .treat_markers_as_missing(args.markers_as_missing)
        .build()?;
    let checker = DataQualityChecker::new(config);
    debug!("Check configuration: {:?}", checker.config());

    let report = checker.check(
        &dataset,
        &check_file.schema,
        check_file.foreign_keys.as_ref(),
        &references,
    )?;

    if report.has_findings() {
        warn!(
            "Dataset '{}': {} findings across {} rows",
            report.dataset_name,
            report.findings.len(),
            report.row_count
        );
    } else {
        info!("Dataset '{}': no findings", report.dataset_name);
    }

    let options = RenderOptions::builder()
        .format(args.format.into())
        .max_rows_listed(args.max_rows_listed)
        .build()?;
    let renderer = ReportRenderer::new(options);
    debug!("Rendering {} report", renderer.options().format);

    match &args.output {
        Some(dir) => {
            renderer.write_to_file(&report, dir)?;
        }
        None => print!("{}", renderer.render(&report)?),
    }

    Ok(())
}

fn load_check_file(path: &str) -> Result<CheckFile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Reading check file {}", path))?;
    let check_file: CheckFile = serde_json::from_str(&content)
        .with_context(|| format!("Parsing check file {}", path))?;
    debug!(
        "Check file {}: {} columns, {} foreign keys",
        path,
        check_file.schema.len(),
        check_file.foreign_keys.as_ref().map_or(0, ForeignKeys::len)
    );
    Ok(check_file)
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}
