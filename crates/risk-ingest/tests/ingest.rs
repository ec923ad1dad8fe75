use std::fs;
use std::path::{Path, PathBuf};

use risk_ingest::{
    IndexColumn, IngestError, TableOptions, load_score_definitions, load_synonyms, read_table,
};
use risk_model::CellValue;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn options(index: IndexColumn) -> TableOptions {
    TableOptions {
        index,
    }
}

#[test]
fn reads_csv_with_missing_tokens() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(
        &dir,
        "patients.csv",
        " Age ,Serum  Creatinine,Sex\n60,1.2,F\n\n71,NA,M\n55,,\n",
    );
    let table = read_table(&path, &TableOptions::default()).expect("read csv");
    assert_eq!(table.columns(), ["Age", "Serum Creatinine", "Sex"]);
    assert_eq!(table.index(), ["0", "1", "2"]);

    let second = table.record(1).expect("second row");
    assert_eq!(second.get("Age"), Some(&CellValue::Number(71.0)));
    assert_eq!(second.get("Serum Creatinine"), Some(&CellValue::Missing));
    assert_eq!(second.get("Sex"), Some(&CellValue::Text("M".into())));
    let third = table.record(2).expect("short row");
    assert_eq!(third.get("Sex"), Some(&CellValue::Missing));
}

#[test]
fn blank_first_header_becomes_the_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(&dir, "wide.csv", ",p1,p2\nage,61,72\nsbp,120,\n");
    let table = read_table(&path, &TableOptions::default()).expect("read csv");
    assert_eq!(table.columns(), ["p1", "p2"]);
    assert_eq!(table.index(), ["age", "sbp"]);
    assert_eq!(
        table.record(1).and_then(|r| r.get("p2").cloned()),
        Some(CellValue::Missing)
    );
}

#[test]
fn named_index_column_is_removed_from_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(&dir, "ids.csv", "patient_id,Age\nA-01,60\nA-02,70\n");
    let table = read_table(&path, &options(IndexColumn::Named("patient_id".into())))
        .expect("read csv");
    assert_eq!(table.columns(), ["Age"]);
    assert_eq!(table.index(), ["A-01", "A-02"]);

    let error = read_table(&path, &options(IndexColumn::Named("mrn".into())))
        .expect_err("missing index column");
    assert!(matches!(error, IngestError::IndexColumn { .. }));
    assert_eq!(error.path(), path.as_path());
}

#[test]
fn tab_separated_files_are_detected_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(&dir, "patients.tsv", "Age\tCreat\n60\t1.2\n");
    let table = read_table(&path, &TableOptions::default()).expect("read tsv");
    assert_eq!(table.columns(), ["Age", "Creat"]);
}

#[test]
fn reads_first_worksheet_of_a_workbook() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("patients.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Age").expect("header");
    sheet.write_string(0, 1, "Creat").expect("header");
    sheet.write_number(1, 0, 60.0).expect("cell");
    sheet.write_number(1, 1, 1.2).expect("cell");
    sheet.write_number(2, 0, 45.0).expect("cell");
    sheet.write_string(2, 1, "N/A").expect("cell");
    workbook.save(&path).expect("save workbook");

    let table = read_table(&path, &TableOptions::default()).expect("read xlsx");
    assert_eq!(table.columns(), ["Age", "Creat"]);
    assert_eq!(table.row_count(), 2);
    let first = table.record(0).expect("first row");
    assert_eq!(first.get("Creat"), Some(&CellValue::Number(1.2)));
    let second = table.record(1).expect("second row");
    assert_eq!(second.get("Creat"), Some(&CellValue::Missing));
}

#[test]
fn unsupported_extensions_are_rejected() {
    let error = read_table(Path::new("patients.parquet"), &TableOptions::default())
        .expect_err("unsupported");
    assert!(matches!(error, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn loads_schema_files_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scores = write(
        &dir,
        "scores.yaml",
        "CKD-EPI:\n  variables: [age, creatinine]\n  formula: score = 141 * creatinine\n",
    );
    let synonyms = write(
        &dir,
        "synonyms.toml",
        "age = [\"Age\"]\ncreatinine = [\"Creat\", \"Cr\"]\n",
    );
    let definitions = load_score_definitions(&scores).expect("scores");
    assert_eq!(
        definitions.get("CKD-EPI").map(|d| d.formula()),
        Some("score = 141 * creatinine")
    );
    let dictionary = load_synonyms(&synonyms).expect("synonyms");
    assert_eq!(
        dictionary.candidates("creatinine"),
        Some(["Creat".to_string(), "Cr".to_string()].as_slice())
    );
}

#[test]
fn load_errors_carry_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = write(&dir, "scores.json", "{ not json");
    let error = load_score_definitions(&broken).expect_err("invalid json");
    assert!(matches!(error, IngestError::Json { .. }));
    assert!(error.to_string().contains("scores.json"));

    let absent = dir.path().join("absent.yaml");
    let error = load_synonyms(&absent).expect_err("missing file");
    assert!(matches!(error, IngestError::Io { .. }));
    assert_eq!(error.path(), absent.as_path());
}
