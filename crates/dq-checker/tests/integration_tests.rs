//! Integration tests for the data quality checker.
//!
//! These tests load CSV fixtures through polars and check them end to end.

use chrono::{DateTime, Utc};
use dq_checker::{
    CheckConfig, CheckError, DataQualityChecker, DataQualityReport, Dataset, FindingKind,
    ForeignKeys, ReferenceError, References, RenderFormat, RenderOptions, ReportRenderer, Row,
    Schema, Value,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckFile {
    name: String,
    schema: Schema,
    #[serde(default)]
    foreign_keys: Option<ForeignKeys>,
}

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_dataset(name: &str, filename: &str) -> Dataset {
    Dataset::from_csv(name, fixtures_path().join(filename)).expect("Failed to read CSV fixture")
}

fn load_check_file(filename: &str) -> CheckFile {
    let content = std::fs::read_to_string(fixtures_path().join(filename))
        .expect("Failed to read check file");
    serde_json::from_str(&content).expect("Failed to parse check file")
}

fn generated_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-09-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn run(dataset: &str, references: &References<'_>) -> DataQualityReport {
    let check_file = load_check_file(&format!("{}.check.json", dataset));
    let data = load_dataset(&check_file.name, &format!("{}.csv", dataset));
    DataQualityChecker::default()
        .check_at(
            &data,
            &check_file.schema,
            check_file.foreign_keys.as_ref(),
            references,
            generated_at(),
        )
        .expect("Check should succeed")
}

/// `(kind, column, rows)` of every finding, in report order.
fn outline(report: &DataQualityReport) -> Vec<(FindingKind, Option<String>, Vec<usize>)> {
    report
        .findings
        .iter()
        .map(|f| (f.kind, f.column.clone(), f.row_indices.clone()))
        .collect()
}

fn col(name: &str) -> Option<String> {
    Some(name.to_string())
}

// ============================================================================
// End-to-End Checks over CSV Fixtures
// ============================================================================

#[test]
fn test_users_fixture() {
    let report = run("users", &References::new());

    assert_eq!(report.dataset_name, "users");
    assert_eq!(report.row_count, 5);
    assert_eq!(
        outline(&report),
        vec![
            (FindingKind::DomainViolation, col("CREATED_DATE"), vec![3]),
            (FindingKind::DomainViolation, col("CREATED_DATE"), vec![4]),
            (FindingKind::DomainViolation, col("STATE"), vec![3]),
            (FindingKind::DomainViolation, col("LANGUAGE"), vec![4]),
            (FindingKind::MissingValue, col("BIRTH_DATE"), vec![2]),
            (FindingKind::MissingValue, col("GENDER"), vec![2]),
            (FindingKind::MissingValue, col("EMAIL"), vec![2]),
        ]
    );

    let email = report.summary("EMAIL").unwrap();
    assert_eq!(email.missing_count, 1);
    assert!((email.missing_percentage - 0.2).abs() < 1e-9);
    assert_eq!(report.candidate_keys, vec!["ID", "CREATED_DATE"]);
    assert!(report.unexpected_columns.is_empty());
}

#[test]
fn test_products_unmatched_brand() {
    let brands = load_dataset("brands", "brands.csv");
    let references = References::new().with(&brands);
    let report = run("products", &references);

    assert_eq!(
        outline(&report),
        vec![
            (FindingKind::MissingValue, col("BRAND_ID"), vec![3]),
            (FindingKind::ReferentialViolation, col("BRAND_ID"), vec![2]),
            (FindingKind::TypeMismatch, col("PRICE"), vec![4]),
        ]
    );

    let referential = report
        .findings_of(FindingKind::ReferentialViolation)
        .next()
        .unwrap();
    assert!(referential.detail.contains("brands.ID"));
    assert!(referential.detail.contains("\"99\""));

    let price = report.summary("PRICE").unwrap().numeric.as_ref().unwrap();
    assert_eq!(price.count, 4);
    assert_eq!(price.min, 1.25);
    assert_eq!(price.max, 4.75);
    assert!((price.mean - 2.875).abs() < 1e-9);
}

#[test]
fn test_transactions_duplicates_and_order() {
    let products = load_dataset("products", "products.csv");
    let references = References::new().with(&products);
    let report = run("transactions", &references);

    assert_eq!(
        outline(&report),
        vec![
            (FindingKind::DomainViolation, col("SCAN_DATE"), vec![4]),
            (FindingKind::DuplicateKey, None, vec![0, 1]),
            (FindingKind::DuplicateRow, None, vec![1]),
            (FindingKind::MissingValue, col("QUANTITY"), vec![3]),
        ]
    );
    assert!(report.candidate_keys.is_empty());
}

#[test]
fn test_transactions_require_products_reference() {
    let check_file = load_check_file("transactions.check.json");
    let data = load_dataset("transactions", "transactions.csv");

    let err = DataQualityChecker::default()
        .check(
            &data,
            &check_file.schema,
            check_file.foreign_keys.as_ref(),
            &References::new(),
        )
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(
        err,
        CheckError::Reference(ReferenceError::MissingDataset { ref column, ref dataset })
            if column == "BARCODE" && dataset == "products"
    ));
}

#[test]
fn test_empty_csv() {
    let check_file = load_check_file("users.check.json");
    let data = load_dataset("users", "users_empty.csv");
    let report = DataQualityChecker::default()
        .check_at(&data, &check_file.schema, None, &References::new(), generated_at())
        .unwrap();

    assert!(report.is_empty);
    assert_eq!(report.row_count, 0);
    assert!(report.findings.is_empty());
    assert_eq!(report.column_summaries.len(), check_file.schema.len());
    assert!(report.candidate_keys.is_empty());
}

#[test]
fn test_nullable_missing_can_be_silenced() {
    let check_file = load_check_file("users.check.json");
    let data = load_dataset("users", "users.csv");
    let config = CheckConfig::builder()
        .flag_missing_in_nullable(false)
        .build()
        .unwrap();
    let report = DataQualityChecker::new(config)
        .check_at(&data, &check_file.schema, None, &References::new(), generated_at())
        .unwrap();

    let missing: Vec<Option<&str>> = report
        .findings_of(FindingKind::MissingValue)
        .map(|f| f.column.as_deref())
        .collect();
    assert_eq!(missing, vec![Some("EMAIL")]);
    assert_eq!(report.summary("GENDER").unwrap().missing_count, 1);
}

#[test]
fn test_late_text_value_in_numeric_column_is_reported() {
    let data = load_dataset("barcodes", "barcodes_mixed.csv");
    let schema: Schema = serde_json::from_str(
        r#"{"columns": [
            {"name": "BARCODE", "expected_type": "integer", "is_key": true},
            {"name": "CATEGORY", "allowed_values": ["Snacks", "Beverages", "Health"]}
        ]}"#,
    )
    .unwrap();
    let report = DataQualityChecker::default()
        .check_at(&data, &schema, None, &References::new(), generated_at())
        .unwrap();

    assert_eq!(report.row_count, 151);
    assert_eq!(
        outline(&report),
        vec![(FindingKind::TypeMismatch, col("BARCODE"), vec![150])]
    );
    let barcode = report.summary("BARCODE").unwrap().numeric.as_ref().unwrap();
    assert_eq!(barcode.count, 150);
    assert_eq!(barcode.max, 1149.0);
}

#[test]
fn test_key_column_from_check_file_is_not_nullable() {
    let check_file = load_check_file("products.check.json");
    assert!(!check_file.schema.get("BARCODE").unwrap().nullable);

    let data = Dataset::from_rows(
        "products",
        vec![
            Row::new().with("BARCODE", 1001).with("BRAND_ID", 1),
            Row::new().with("BARCODE", Value::Null).with("BRAND_ID", Value::Null),
        ],
    );
    let config = CheckConfig::builder()
        .flag_missing_in_nullable(false)
        .build()
        .unwrap();
    let report = DataQualityChecker::new(config)
        .check_at(&data, &check_file.schema, None, &References::new(), generated_at())
        .unwrap();

    let missing: Vec<Option<&str>> = report
        .findings_of(FindingKind::MissingValue)
        .map(|f| f.column.as_deref())
        .collect();
    assert_eq!(missing, vec![Some("BARCODE")]);
}

// ============================================================================
// Report Invariants
// ============================================================================

#[test]
fn test_row_count_and_missing_counts_match_input() {
    let data = load_dataset("users", "users.csv");
    let check_file = load_check_file("users.check.json");
    let report = DataQualityChecker::default()
        .check_at(&data, &check_file.schema, None, &References::new(), generated_at())
        .unwrap();

    assert_eq!(report.row_count, data.len());
    for summary in &report.column_summaries {
        let expected = data
            .rows()
            .iter()
            .filter(|row| row.get(&summary.column).is_missing())
            .count();
        assert_eq!(summary.missing_count, expected, "column {}", summary.column);
    }
}

#[test]
fn test_check_is_idempotent() {
    let brands = load_dataset("brands", "brands.csv");
    let references = References::new().with(&brands);
    let first = run("products", &references);
    let second = run("products", &references);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_identical_rows_from_dataframe() {
    let df = df! {
        "RECEIPT_ID" => &["r1", "r1", "r2"],
        "QUANTITY" => &[Some(1i64), Some(1), None],
    }
    .unwrap();
    let data = Dataset::from_dataframe("receipts", &df).unwrap();
    let schema: Schema = serde_json::from_str(
        r#"{"columns": [{"name": "RECEIPT_ID"}, {"name": "QUANTITY", "expected_type": "integer"}]}"#,
    )
    .unwrap();
    let report = DataQualityChecker::default()
        .check_at(&data, &schema, None, &References::new(), generated_at())
        .unwrap();

    let duplicates: Vec<Vec<usize>> = report
        .findings_of(FindingKind::DuplicateRow)
        .map(|f| f.row_indices.clone())
        .collect();
    assert_eq!(duplicates, vec![vec![1]]);
}

#[test]
fn test_rows_built_in_code_match_csv() {
    let from_csv = load_dataset("brands", "brands.csv");
    let in_code = Dataset::from_rows(
        "brands",
        vec![
            Row::new().with("ID", 1).with("NAME", "Acme"),
            Row::new().with("ID", 2).with("NAME", "Globex"),
            Row::new().with("ID", 3).with("NAME", "Initech"),
        ],
    );

    assert_eq!(from_csv, in_code);
    assert_eq!(from_csv.value(0, "ID"), &Value::Integer(1));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_and_write_markdown() {
    let brands = load_dataset("brands", "brands.csv");
    let references = References::new().with(&brands);
    let report = run("products", &references);

    let renderer = ReportRenderer::new(
        RenderOptions::builder()
            .format(RenderFormat::Markdown)
            .build()
            .unwrap(),
    );
    let dir = std::env::temp_dir().join(format!("dq_checker_it_{}", std::process::id()));
    let path = renderer.write_to_file(&report, &dir).unwrap();

    assert_eq!(path.file_name().unwrap(), "products_quality_report.md");
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("# Data quality report: products"));
    assert!(content.contains("| referential_violation | BRAND_ID | 2 |"));
    assert!(content.contains("- Resolve unmatched references: "));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_render_json_to_string() {
    let report = run("users", &References::new());
    let renderer = ReportRenderer::new(
        RenderOptions::builder()
            .format(RenderFormat::Json)
            .build()
            .unwrap(),
    );
    let json: serde_json::Value = serde_json::from_str(&renderer.render(&report).unwrap()).unwrap();

    assert_eq!(json["dataset_name"], "users");
    assert_eq!(json["row_count"], 5);
    assert_eq!(json["findings"].as_array().unwrap().len(), 7);
    assert_eq!(json["findings"][0]["kind"], "domain_violation");
}
