mod common;

use common::text_row;
use fairvis::error::FairError;
use fairvis::loader::Workbook;
use fairvis::merge::merge_workbook;
use fairvis::table::Table;
use std::fs;

fn sheet(name: &str, rows: &[&[&str]]) -> Table {
    let mut rows = rows.iter();
    let header = rows.next().unwrap().iter().map(|c| c.to_string()).collect();
    Table::from_rows(name, header, rows.map(|r| text_row(r)).collect())
}

fn indicators() -> Table {
    sheet(
        "indicators",
        &[
            &["ID", "Category", "Indicator"],
            &["F1", "Model", "Persistent identifier"],
            &["A1", "Model", "Accessible"],
            &["R1", "Archive", "License"],
        ],
    )
}

fn models() -> Table {
    sheet("models", &[&["ID", "Name"], &["m1", "First"], &["m2", "Second"]])
}

#[test]
fn merges_model_sheets_onto_indicators() {
    let workbook = Workbook {
        sheets: vec![
            indicators(),
            models(),
            sheet("m1", &[&["ID", "Assessment"], &["R1", "0.5"], &["F1", "1"]]),
            sheet("m2", &[&["ID", "Assessment"], &["A1", "0"], &["Z9", "1"]]),
        ],
    };
    let merged = merge_workbook(&workbook).unwrap();

    assert_eq!(merged.merged.len(), 2);
    assert!(!merged.is_valid());
    assert!(merged.validity[0].valid);
    assert_eq!(merged.validity[1].model_id, "m2");
    assert!(!merged.validity[1].valid);
    assert_eq!(merged.validity[1].unknown_indicators, vec!["Z9".to_string()]);

    let m1 = merged.model("m1").unwrap();
    assert_eq!(m1.name, "m1");
    assert_eq!(m1.columns(), &["ID", "Category", "Indicator", "Assessment"].map(String::from)[..]);
    // Indicator order is kept
    assert_eq!(m1.text(0, "ID"), Some("F1".to_string()));
    assert_eq!(m1.number(1, "Assessment"), Some(0.5));

    // Unknown indicators drop out of the inner join
    assert_eq!(merged.model("m2").unwrap().len(), 1);
}

#[test]
fn missing_sheets_are_errors() {
    let workbook = Workbook {
        sheets: vec![models()],
    };
    assert!(matches!(merge_workbook(&workbook), Err(FairError::MissingSheet(s)) if s == "indicators"));

    let workbook = Workbook {
        sheets: vec![indicators()],
    };
    assert!(matches!(merge_workbook(&workbook), Err(FairError::MissingSheet(s)) if s == "models"));
}

#[test]
fn sheet_for_undeclared_model_is_rejected() {
    let workbook = Workbook {
        sheets: vec![
            indicators(),
            models(),
            sheet("m3", &[&["ID", "Assessment"], &["F1", "1"]]),
        ],
    };
    let err = merge_workbook(&workbook).unwrap_err();
    assert_eq!(err.to_string(), "model_id 'm3' not in ids");
}

#[test]
fn writes_one_csv_per_table() {
    let workbook = Workbook {
        sheets: vec![
            indicators(),
            models(),
            sheet("m1", &[&["ID", "Assessment"], &["F1", "1"]]),
        ],
    };
    let merged = merge_workbook(&workbook).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let written = merged.write_csvs(dir.path().join("out")).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["indicators.csv", "models.csv", "m1.csv"]);

    let m1 = fs::read_to_string(dir.path().join("out").join("m1.csv")).unwrap();
    assert_eq!(m1, "ID,Category,Indicator,Assessment\nF1,Model,Persistent identifier,1\n");
}
