use std::fs;
use std::path::PathBuf;

use credit_ingest::{IngestError, IngestOptions, bytes_fingerprint, read_source};
use credit_model::{ColumnPosition, PositionalName, SourceLayout, Value};

fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn drops_index_column() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(
        &dir,
        "german.csv",
        ",account_status,age,amount,BAD\n1,A11,67,1169,GOOD\n2,A12,22,5951,BAD\n",
    );
    let layout = SourceLayout {
        index_column: true,
        ..SourceLayout::default()
    };
    let options = IngestOptions::try_from(&layout).expect("ascii delimiter");
    let records = read_source(&path, &options).expect("read csv").records;

    assert_eq!(records.columns(), &["account_status", "age", "amount", "BAD"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records.value(1, "age"), Some(&Value::Number(22.0)));
}

#[test]
fn headerless_source_gets_positional_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(
        &dir,
        "nfl.csv",
        "New England,27,74,210,5,QB,1,1,0.91\nDenver,-1,70,190,2,WR,0,1,0.12\n",
    );
    let layout = SourceLayout {
        has_headers: false,
        positional: vec![
            PositionalName {
                name: "team".to_string(),
                position: ColumnPosition::Index(0),
            },
            PositionalName {
                name: "score".to_string(),
                position: ColumnPosition::FromEnd(1),
            },
            PositionalName {
                name: "true_label".to_string(),
                position: ColumnPosition::FromEnd(3),
            },
        ],
        ..SourceLayout::default()
    };
    let options = IngestOptions::try_from(&layout).expect("ascii delimiter");
    let records = read_source(&path, &options).expect("read csv").records;

    assert_eq!(records.columns().len(), 9);
    assert_eq!(records.columns()[0], "team");
    assert_eq!(records.columns()[1], "1");
    assert_eq!(records.columns()[6], "true_label");
    assert_eq!(records.columns()[8], "score");
    assert_eq!(records.value(0, "team"), Some(&Value::text("New England")));
    assert_eq!(records.value(1, "score"), Some(&Value::Number(0.12)));
}

#[test]
fn positional_name_outside_row_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(&dir, "narrow.csv", "a,b\n");
    let layout = SourceLayout {
        has_headers: false,
        positional: vec![PositionalName {
            name: "score".to_string(),
            position: ColumnPosition::Index(5),
        }],
        ..SourceLayout::default()
    };
    let options = IngestOptions::try_from(&layout).expect("ascii delimiter");
    let error = read_source(&path, &options).unwrap_err();
    assert!(matches!(error, IngestError::PositionOutOfRange { width: 2, .. }));
}

#[test]
fn semicolon_delimiter_and_blank_lines() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = temp_file(&dir, "uk.csv", "Age;Amount;BAD\n\n40;1000;GOOD\n;;\n19;250;BAD\n");
    let layout = SourceLayout {
        delimiter: ';',
        ..SourceLayout::default()
    };
    let options = IngestOptions::try_from(&layout).expect("ascii delimiter");
    let records = read_source(&path, &options).expect("read csv").records;

    assert_eq!(records.len(), 2);
    assert_eq!(records.value(1, "Amount"), Some(&Value::Number(250.0)));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let error = read_source(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(error, IngestError::Io { .. }));
    assert!(error.to_string().contains("absent.csv"));
}

#[test]
fn fingerprint_covers_the_parsed_bytes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let contents = "A\n1\n";
    let first = temp_file(&dir, "a.csv", contents);
    let second = temp_file(&dir, "b.csv", "A\n2\n");

    let source = read_source(&first, &IngestOptions::default()).expect("read a");
    assert_eq!(source.sha256, bytes_fingerprint(contents.as_bytes()));
    assert_eq!(source.records.value(0, "A"), Some(&Value::Number(1.0)));

    let other = read_source(&second, &IngestOptions::default()).expect("read b");
    assert_eq!(other.sha256.len(), 64);
    assert_ne!(source.sha256, other.sha256);
}
